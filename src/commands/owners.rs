use anyhow::{Context, Result};

use shiftlog::i18n::t;

use super::{print_json, App, SenderArgs};

pub fn set_owners(app: &App, chats: &[i64], sender: &SenderArgs) -> Result<()> {
    app.authorize(sender)?;

    for &chat in chats {
        let added = app
            .repo
            .add_owner_chat(chat)
            .with_context(|| format!("Failed to add owner chat {chat}"))?;
        tracing::info!(chat, added, "Owner chat registered");
    }

    let owners = app.repo.owner_chats()?;
    eprintln!("{}", t!("cli.owners.updated", count = owners.len()));
    print_json(&owners)
}
