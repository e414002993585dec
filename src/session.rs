//! Interactive line-oriented session driving the [`Controller`].

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use crate::controller::{ActionOutcome, Controller, Page};
use crate::display;
use crate::error::{Result, TolmachError};
use crate::extract::UploadedFile;
use crate::search::TypeFacet;

const HELP: &str = "\
Commands:
  open <path>       select a file for extraction
  extract           extract text from the selected file and translate it
  text <text>       replace the text to translate
  translate         translate the current text
  history           show the history page
  search [query]    filter the history by text (empty clears)
  kind [text|stt|itt]  filter the history by source type (empty clears)
  show <id>         preview a history record
  close             close the preview
  reuse <id>        load a history record back into the editor
  remove <id>       delete a history record
  clear             delete every history record
  home              back to the home page
  state             print the current state
  help              this message
  quit              leave the session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Open(String),
    Extract,
    Text(String),
    Translate,
    History,
    Search(String),
    Kind(Option<TypeFacet>),
    Show(u64),
    Close,
    Reuse(u64),
    Remove(u64),
    Clear,
    Home,
    State,
    Help,
    Quit,
}

fn parse_id(arg: &str) -> Result<u64> {
    arg.trim()
        .parse()
        .map_err(|_| TolmachError::Config(format!("'{}' is not a record id", arg.trim())))
}

impl SessionCommand {
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let command = match word.to_lowercase().as_str() {
            "open" if !rest.is_empty() => Self::Open(rest.to_string()),
            "extract" => Self::Extract,
            "text" => Self::Text(rest.to_string()),
            "translate" => Self::Translate,
            "history" => Self::History,
            "search" => Self::Search(rest.to_string()),
            "kind" => Self::Kind(TypeFacet::parse_optional(rest)?),
            "show" => Self::Show(parse_id(rest)?),
            "close" => Self::Close,
            "reuse" => Self::Reuse(parse_id(rest)?),
            "remove" => Self::Remove(parse_id(rest)?),
            "clear" => Self::Clear,
            "home" => Self::Home,
            "state" => Self::State,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => {
                return Err(TolmachError::Config(format!(
                    "Unknown command '{}'. Type 'help' for the list",
                    line
                )))
            }
        };
        Ok(Some(command))
    }
}

/// Apply one command and return what to print. `None` ends the session.
pub async fn execute(controller: &mut Controller, command: SessionCommand) -> Result<Option<String>> {
    let output = match command {
        SessionCommand::Open(path) => {
            let file = UploadedFile::from_path(&path)?;
            if !file.is_accepted() {
                return Err(TolmachError::UnsupportedFormat(file.name));
            }
            controller.select_file(file);
            display::state(controller.state())
        }
        SessionCommand::Extract => {
            let pb = display::spinner("Analyzing file...");
            let outcome = controller.extract().await;
            pb.finish_and_clear();
            match outcome? {
                ActionOutcome::Done => format!(
                    "Extracted text:\n  {}\n\nTranslations:\n{}",
                    controller.state().editable_text,
                    controller.state().translations.as_ref().map(display::translations).unwrap_or_default()
                ),
                ActionOutcome::Skipped => "Select a file first with 'open <path>'".to_string(),
                ActionOutcome::Suppressed => "An extraction is already running".to_string(),
            }
        }
        SessionCommand::Text(text) => {
            controller.set_text(text);
            "Text updated".to_string()
        }
        SessionCommand::Translate => {
            let pb = display::spinner("Translating...");
            let outcome = controller.translate().await;
            pb.finish_and_clear();
            match outcome? {
                ActionOutcome::Done => controller
                    .state()
                    .translations
                    .as_ref()
                    .map(display::translations)
                    .unwrap_or_default(),
                ActionOutcome::Skipped => "Nothing to translate, set some text with 'text <...>'".to_string(),
                ActionOutcome::Suppressed => "A translation is already running".to_string(),
            }
        }
        SessionCommand::History => {
            controller.show_history();
            display::history_table(&controller.visible_history())
        }
        SessionCommand::Search(query) => {
            controller.set_query(query);
            display::history_table(&controller.visible_history())
        }
        SessionCommand::Kind(facet) => {
            controller.set_facet(facet);
            display::history_table(&controller.visible_history())
        }
        SessionCommand::Show(id) => display::record(controller.open_record(id)?),
        SessionCommand::Close => {
            controller.close_preview();
            "Preview closed".to_string()
        }
        SessionCommand::Reuse(id) => {
            controller.reuse_record(id)?;
            display::state(controller.state())
        }
        SessionCommand::Remove(id) => {
            if controller.remove_record(id) {
                format!("Removed record {}", id)
            } else {
                format!("No record {}", id)
            }
        }
        SessionCommand::Clear => {
            controller.clear_history();
            "History cleared".to_string()
        }
        SessionCommand::Home => {
            controller.show_home();
            display::state(controller.state())
        }
        SessionCommand::State => display::state(controller.state()),
        SessionCommand::Help => HELP.to_string(),
        SessionCommand::Quit => return Ok(None),
    };
    Ok(Some(output))
}

/// Read commands from stdin until `quit` or end of input
pub async fn run(controller: &mut Controller) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}\n", HELP);

    loop {
        let prompt = match controller.state().page {
            Page::Home => "home",
            Page::History => "history",
        };
        print!("{}> ", prompt);
        std::io::Write::flush(&mut std::io::stdout())?;

        let Some(line) = lines.next_line().await? else {
            debug!("End of input, leaving session");
            return Ok(());
        };

        let command = match SessionCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match execute(controller, command).await {
            Ok(Some(output)) => println!("{}", output),
            Ok(None) => return Ok(()),
            Err(e) => {
                warn!("Session command failed: {}", e);
                if let Some(alert) = controller.state().alert.clone() {
                    println!("{}", alert);
                    controller.dismiss_alert();
                } else {
                    println!("{}", e);
                }
            }
        }
    }
}
