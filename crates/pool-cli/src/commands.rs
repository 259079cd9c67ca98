//! Subcommand handlers

use anyhow::{anyhow, bail};
use clap::ArgMatches;
use pool_catalog::ReferenceList;
use pool_core::{progress_label, EggPool, PoolConfig, SubmissionForm};
use pool_model::ErrorKind;
use pool_store::GitHubContentsConfig;
use pool_ui::{LookupState, SearchSelect};

fn arg<'a>(args: &'a ArgMatches, name: &str) -> &'a str {
    args.get_one::<String>(name).map_or("", String::as_str)
}

pub(crate) async fn gallery(pool: &EggPool) -> anyhow::Result<()> {
    let gallery = pool
        .gallery()
        .await
        .map_err(|e| anyhow!("Failed to load eggs: {e}"))?;

    if gallery.is_empty() {
        println!("No eggs yet. Be the first to submit one!");
        return Ok(());
    }

    println!("{}", gallery.count_label());
    if gallery.skipped() > 0 {
        eprintln!("({} unreadable records not shown)", gallery.skipped());
    }
    for card in gallery.cards() {
        println!();
        println!("{card}");
    }
    Ok(())
}

pub(crate) async fn lookup(pool: &EggPool, args: &ArgMatches) -> anyhow::Result<()> {
    match pool.lookup(arg(args, "name")).await {
        Ok(entity) => {
            println!("{}", entity.display_label());
            println!("{}", entity.image_ref);
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => bail!("Pokemon not found"),
        Err(e) => Err(e.into()),
    }
}

pub(crate) async fn search(pool: &EggPool, args: &ArgMatches) -> anyhow::Result<()> {
    let label = arg(args, "list");
    let list = ReferenceList::from_label(label).ok_or_else(|| anyhow!("unknown list: {label}"))?;
    let names = pool.reference_list(list).await?;

    let select = pool.select_for(names);
    select.set_query(arg(args, "query"));
    for name in select.results() {
        println!("{name}");
    }
    Ok(())
}

pub(crate) async fn lists(pool: &EggPool) -> anyhow::Result<()> {
    let lists = pool.reference_lists().await;
    for list in ReferenceList::ALL {
        match lists.get(list) {
            Ok(names) => println!("{:<10} {}", list.label(), names.len()),
            Err(e) => println!("{:<10} unavailable: {e}", list.label()),
        }
    }
    Ok(())
}

/// Snap free text to a reference entry when one matches exactly
fn canonical(select: &SearchSelect, text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        return String::new();
    }
    select.set_query(text);
    let exact = select
        .results()
        .into_iter()
        .find(|name| name.eq_ignore_ascii_case(text));
    match exact {
        Some(name) => select.confirm(Some(&name)).unwrap_or(name),
        None => {
            tracing::debug!("'{}' is not in the reference list, keeping as typed", text);
            text.to_string()
        }
    }
}

pub(crate) async fn submit(pool: &EggPool, args: &ArgMatches) -> anyhow::Result<()> {
    let species = pool.species_field();
    species.on_input_change(arg(args, "pokemon"));
    let entity = match species.settled().await {
        LookupState::Matched(entity) => entity,
        LookupState::Unavailable { message, .. } => bail!("Lookup unavailable: {message}"),
        LookupState::Idle => {
            bail!("Please enter a valid Pokemon name and wait for it to be confirmed.")
        }
        LookupState::NotFound { .. } | LookupState::Pending { .. } => bail!("Pokemon not found"),
    };
    eprintln!("{}", entity.display_label());

    let lists = pool.reference_lists().await;
    let abilities = pool.select_for(lists.names_or_empty(ReferenceList::Abilities).to_vec());
    let items = pool.select_for(lists.names_or_empty(ReferenceList::Items).to_vec());
    let moves = pool.select_for(lists.names_or_empty(ReferenceList::Moves).to_vec());

    let form = SubmissionForm::new(arg(args, "trainer"))
        .with_nickname(arg(args, "nickname"))
        .with_ability(canonical(&abilities, arg(args, "ability")))
        .with_item(canonical(&items, arg(args, "item")))
        .with_moves(
            args.get_many::<String>("move")
                .into_iter()
                .flatten()
                .map(|m| canonical(&moves, m)),
        )
        .with_message(arg(args, "message"));

    let max_attempts = pool.config().append.max_attempts;
    let mut last_label = String::new();
    let receipt = pool
        .submissions()
        .submit_observed(&form, Some(&entity), |state| {
            let label = progress_label(state, max_attempts);
            if !state.is_terminal() && label != last_label {
                eprintln!("{label}");
                last_label = label;
            }
        })
        .await?;

    println!("{}", receipt.detail());
    Ok(())
}

pub(crate) fn init_config(args: &ArgMatches) -> anyhow::Result<()> {
    let github = GitHubContentsConfig::new(arg(args, "owner"), arg(args, "repo"));
    let config = PoolConfig::new().with_github(github);
    print!("{}", config.to_toml_string()?);
    Ok(())
}
