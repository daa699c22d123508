pub mod gpo;
pub mod settings;

pub use gpo::*;
pub use settings::*;

use crate::cli::Commands;
use crate::error::AppResult;
use crate::infrastructure::{PolicyManager, RegistryStore};

/// Run one CLI command and return the text to print
pub async fn execute<S: RegistryStore>(
    command: &Commands,
    manager: &PolicyManager<S>,
) -> AppResult<String> {
    match command {
        Commands::List { format, .. } => list_gpos(manager, *format).await,
        Commands::Get {
            id, name, format, ..
        } => get_gpo(manager, id.as_deref(), name.as_deref(), *format).await,
        Commands::Create {
            name, description, ..
        } => create_gpo(manager, name, description.as_deref()).await,
        Commands::Delete { id, .. } => delete_gpo(manager, id).await,
        Commands::Settings { gpo_id, format, .. } => list_settings(manager, gpo_id, *format).await,
        Commands::Set {
            gpo_id,
            name,
            value,
            kind,
            path,
            scope,
            ..
        } => {
            let args = SetSettingArgs {
                gpo_id,
                name,
                value,
                kind: *kind,
                path,
                scope: *scope,
            };
            set_setting(manager, args).await
        }
        Commands::Remove { gpo_id, name, .. } => remove_setting(manager, gpo_id, name).await,
        Commands::Link { gpo_id, ou, .. } => link_gpo(manager, gpo_id, ou).await,
        Commands::Unlink { gpo_id, ou, .. } => unlink_gpo(manager, gpo_id, ou).await,
    }
}
