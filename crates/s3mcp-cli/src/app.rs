//! The interactive menu loop.

use crate::client::ToolClient;
use crate::menu::{MenuChoice, MENU};
use crate::prompt::Prompter;
use crate::render::{self, ObjectView};
use crate::requests;
use anyhow::Context;
use std::io::{BufRead, Write};
use std::path::Path;

enum Flow {
    Continue,
    Exit,
}

/// Read an answer or leave the loop at end of input.
macro_rules! ask_or_exit {
    ($prompter:expr, $label:expr) => {
        match $prompter.ask($label)? {
            Some(answer) => answer,
            None => return Ok(Flow::Exit),
        }
    };
}

macro_rules! confirm_or_exit {
    ($prompter:expr, $label:expr) => {
        match $prompter.confirm($label)? {
            Some(answer) => answer,
            None => return Ok(Flow::Exit),
        }
    };
}

/// Run the menu until the user picks Exit or input ends.
///
/// A failed tool call is printed and the menu is shown again.
pub async fn run<R, W, C>(prompter: &mut Prompter<R, W>, client: &C) -> anyhow::Result<()>
where
    R: BufRead,
    W: Write,
    C: ToolClient + ?Sized,
{
    loop {
        prompter.say(MENU)?;
        let Some(line) = prompter.ask("\nSelect an operation (1-8): ")? else {
            break;
        };
        let Some(choice) = MenuChoice::parse(&line) else {
            prompter.say("Invalid choice, please try again.")?;
            continue;
        };

        match handle(choice, prompter, client).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => break,
            Err(e) => prompter.say(format!("{:#}", e))?,
        }
    }
    Ok(())
}

async fn handle<R, W, C>(
    choice: MenuChoice,
    prompter: &mut Prompter<R, W>,
    client: &C,
) -> anyhow::Result<Flow>
where
    R: BufRead,
    W: Write,
    C: ToolClient + ?Sized,
{
    match choice {
        MenuChoice::ListBuckets => {
            tracing::info!("Listing buckets");
            let payload = client
                .call(requests::list_buckets())
                .await
                .context("Error listing buckets")?;
            prompter.say(render::bucket_list(&payload))?;
        }
        MenuChoice::CreateBucket => {
            let bucket = ask_or_exit!(prompter, "Enter name for new bucket: ");
            let region = ask_or_exit!(prompter, "Enter region (leave blank for default): ");
            tracing::info!(bucket = %bucket, "Creating bucket");
            let payload = client
                .call(requests::create_bucket(&bucket, region.trim()))
                .await
                .context("Error creating bucket")?;
            prompter.say(render::receipt("Bucket creation result", &payload))?;
        }
        MenuChoice::DeleteBucket => {
            let bucket = ask_or_exit!(prompter, "Enter bucket name to delete: ");
            let force = confirm_or_exit!(prompter, "Force deletion of non-empty bucket? (y/n): ");
            tracing::info!(bucket = %bucket, force, "Deleting bucket");
            let payload = client
                .call(requests::delete_bucket(&bucket, force))
                .await
                .context("Error deleting bucket")?;
            prompter.say(render::receipt("Bucket deletion result", &payload))?;
        }
        MenuChoice::ListObjects => {
            let bucket = ask_or_exit!(prompter, "Enter bucket name to list objects: ");
            let prefix = ask_or_exit!(prompter, "Enter prefix filter (optional): ");
            tracing::info!(bucket = %bucket, "Listing objects");
            let payload = client
                .call(requests::list_objects(&bucket, &prefix))
                .await
                .context("Error listing objects")?;
            prompter.say(render::object_list(&bucket, &payload))?;
        }
        MenuChoice::GetObject => {
            let bucket = ask_or_exit!(prompter, "Enter bucket name: ");
            let key = ask_or_exit!(prompter, "Enter object key: ");
            tracing::info!(bucket = %bucket, key = %key, "Retrieving object");
            let payload = client
                .call(requests::get_object(&bucket, &key))
                .await
                .context("Error retrieving object")?;

            let view = ObjectView::from_payload(&payload)?;
            prompter.say(view.metadata())?;
            prompter.say(view.preview())?;

            let label = if view.binary {
                "Save to file? (y/n): "
            } else {
                "Save text to file? (y/n): "
            };
            if confirm_or_exit!(prompter, label) {
                let path = ask_or_exit!(prompter, "Enter save path: ");
                let bytes = view.bytes().context("Error saving file")?;
                std::fs::write(&path, bytes)
                    .with_context(|| format!("Error saving file to {}", path))?;
                prompter.say(format!("File saved successfully to {}", path))?;
            }
        }
        MenuChoice::UploadObject => {
            let bucket = ask_or_exit!(prompter, "Enter bucket name: ");
            let key = ask_or_exit!(prompter, "Enter object key for the new file: ");
            let source = ask_or_exit!(prompter, "Upload from (1) Text input or (2) File path? ");

            let request = if source.trim() == "1" {
                let content = ask_or_exit!(prompter, "Enter content for the new file: ");
                requests::put_text(&bucket, &key, &content)
            } else {
                let path = ask_or_exit!(prompter, "Enter path to file: ");
                requests::put_file(&bucket, &key, Path::new(path.trim()))
                    .with_context(|| format!("Error reading file {}", path.trim()))?
            };

            tracing::info!(bucket = %bucket, key = %key, "Uploading object");
            let payload = client
                .call(request)
                .await
                .context("Error uploading object")?;
            prompter.say(render::receipt("Upload result", &payload))?;
        }
        MenuChoice::DeleteObject => {
            let bucket = ask_or_exit!(prompter, "Enter bucket name: ");
            let key = ask_or_exit!(prompter, "Enter object key to delete: ");
            tracing::info!(bucket = %bucket, key = %key, "Deleting object");
            let payload = client
                .call(requests::delete_object(&bucket, &key))
                .await
                .context("Error deleting object")?;
            prompter.say(render::receipt("Delete result", &payload))?;
        }
        MenuChoice::Exit => {
            prompter.say("Exiting...")?;
            return Ok(Flow::Exit);
        }
    }
    Ok(Flow::Continue)
}
