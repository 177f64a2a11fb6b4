//! Command dispatch: loads the trees directory, mounts every tree and runs
//! the requested operation against the group.

use std::io;
use std::sync::Arc;

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument, warn};

use crate::application::ApplicationError;
use crate::application::services::{SharedFilterIndex, SkillTreeGroup, TreeSession};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::{JsonFileSaveHandler, TreeLoader};
use crate::tree_render::TreeRender;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load(cli.trees_dir.as_deref())?;
    debug!("settings: {:?}", settings);

    match &cli.command {
        Some(Commands::List) => cmd_list(&settings),
        Some(Commands::Tree { tree }) => cmd_tree(&settings, tree),
        Some(Commands::Count) => cmd_count(&settings),
        Some(Commands::Search { term }) => cmd_search(&settings, term),
        Some(Commands::AddPoint { tree, skill }) => {
            mutate(&settings, tree, |session| {
                let points = session.add_point(skill)?;
                Ok(format!("{}: {} point(s)", skill, points))
            })
        }
        Some(Commands::RemovePoint { tree, skill }) => {
            mutate(&settings, tree, |session| {
                let points = session.remove_point(skill)?;
                Ok(format!("{}: {} point(s)", skill, points))
            })
        }
        Some(Commands::Select { tree, skill }) => mutate(&settings, tree, |session| {
            session.select(skill)?;
            Ok(format!("selected {}", skill))
        }),
        Some(Commands::Deselect { tree, skill }) => mutate(&settings, tree, |session| {
            session.deselect(skill)?;
            Ok(format!("deselected {}", skill))
        }),
        Some(Commands::Reset { tree: Some(tree) }) => mutate(&settings, tree, |session| {
            session.reset()?;
            Ok(format!("reset {}", session.tree_id()))
        }),
        Some(Commands::Reset { tree: None }) => cmd_reset_all(&settings),
        Some(Commands::Config { command }) => cmd_config(&settings, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage("no command given, see --help".to_string())),
    }
}

/// Load every tree of the trees directory and mount it with its saved state.
#[instrument(level = "debug", skip_all)]
fn mount_all(settings: &Settings) -> CliResult<SkillTreeGroup> {
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let loader = TreeLoader::new(fs.clone());
    let store = JsonFileSaveHandler::new(fs, &settings.state_dir);
    let mut group = SkillTreeGroup::new(SharedFilterIndex::global().clone());

    for tree in loader.load_directory(&settings.trees_dir)? {
        if group.session(&tree.tree_id).is_some() {
            warn!("tree id {} defined twice, last definition wins", tree.tree_id);
        }
        let saved = store.load(settings.storage, &tree.tree_id)?;
        group.mount(tree, saved, settings.storage, Some(Box::new(store.clone())))?;
    }
    Ok(group)
}

fn mutate<F>(settings: &Settings, tree_id: &str, op: F) -> CliResult<()>
where
    F: FnOnce(&mut TreeSession) -> CliResult<String>,
{
    let mut group = mount_all(settings)?;
    let session = group.session_mut(tree_id)?;
    let message = op(session)?;
    output::success(&message);
    Ok(())
}

fn cmd_list(settings: &Settings) -> CliResult<()> {
    let group = mount_all(settings)?;
    for id in group.tree_ids() {
        if let Some(session) = group.session(id) {
            let tree = session.tree();
            output::info(&format!(
                "{}\t{}\t{} skills\t{} selected",
                id,
                tree.title,
                session.node_count(),
                session.selected_count()
            ));
        }
    }
    Ok(())
}

fn cmd_tree(settings: &Settings, tree_id: &str) -> CliResult<()> {
    let group = mount_all(settings)?;
    let session = group
        .session(tree_id)
        .ok_or_else(|| ApplicationError::UnknownTree(tree_id.to_string()))?;
    output::info(&session.to_tree_string());
    if let Some(description) = &session.tree().description {
        output::detail(description);
    }
    Ok(())
}

fn cmd_count(settings: &Settings) -> CliResult<()> {
    let group = mount_all(settings)?;
    output::header("Skills per tree");
    for id in group.tree_ids() {
        output::count(id, group.count_of(id).unwrap_or(0));
    }
    output::count("total", group.total_count());
    output::count("selected", group.selected_count());
    Ok(())
}

fn cmd_search(settings: &Settings, term: &str) -> CliResult<()> {
    let group = mount_all(settings)?;
    let visible = group.visible(term);
    if visible.is_empty() {
        output::warning(&format!("no tree matches '{}'", term));
        return Ok(());
    }
    output::info(&visible.iter().join("\n"));
    Ok(())
}

fn cmd_reset_all(settings: &Settings) -> CliResult<()> {
    let mut group = mount_all(settings)?;
    group.reset_all()?;
    output::success(&format!("reset {} tree(s)", group.len()));
    Ok(())
}

fn cmd_config(settings: &Settings, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::warning("no global config directory on this platform"),
            }
            output::action("local", &local_config_path(&settings.trees_dir).display());
        }
    }
    Ok(())
}
