// UI layer: the whole run, start to finish. Load (or collect) the sender
// profile, pick and fill in the message, show it, ask before sending, then
// save and submit. Every step is linear; only the field prompts loop.

use crate::api::{FormClient, SubmissionOutcome};
use crate::config::Settings;
use crate::message::{file_name, MessageStore};
use crate::profile::{collect_missing_fields, ProfileStore, SenderProfile};
use crate::prompt::Prompter;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::time::Duration;

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// The operator declined to send. The profile was still saved.
    Declined,
    Submitted(SubmissionOutcome),
}

impl RunOutcome {
    /// Process exit code: 1 when the endpoint rejected the submission,
    /// 0 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Submitted(SubmissionOutcome::Rejected { .. }) => 1,
            _ => 0,
        }
    }
}

/// Everything one run needs, injected by `main` (or a test).
pub struct Session<'a, P: ?Sized, W: ?Sized> {
    pub settings: &'a Settings,
    pub client: &'a FormClient,
    pub prompter: &'a mut P,
    pub out: &'a mut W,
    /// Whether stdin is a terminal. When it is not, sending needs no
    /// confirmation.
    pub interactive: bool,
}

impl<'a, P, W> Session<'a, P, W>
where
    P: Prompter + ?Sized,
    W: Write + ?Sized,
{
    /// Run the tool once. `args` are the positional arguments: exactly two
    /// means an explicit subject and message.
    pub fn run(&mut self, args: &[String]) -> Result<RunOutcome> {
        let profile = self.load_profile()?;

        let messages = MessageStore::new(&self.settings.subject_path, &self.settings.message_path);
        let templates = messages.resolve(args, self.out)?;

        writeln!(self.out, "Filling {{placeholders}} with sender information...")?;
        let rendered = templates
            .render(&profile)
            .context("Failed to fill in the message")?;

        writeln!(self.out, "Message ready!")?;
        writeln!(self.out)?;
        writeln!(self.out, "Subject: {}", rendered.subject)?;
        writeln!(self.out, "Message: {}", rendered.body)?;
        writeln!(self.out)?;

        if !self.confirm_send()? {
            writeln!(self.out, "Not sending or saving message. Goodbye!")?;
            return Ok(RunOutcome::Declined);
        }

        messages.save(&rendered, self.out)?;

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
        spinner.set_message("Sending...");
        spinner.enable_steady_tick(Duration::from_millis(100));
        let outcome = self.client.submit(&rendered, &profile);
        spinner.finish_and_clear();

        let outcome = outcome?;
        outcome.report(self.out)?;
        Ok(RunOutcome::Submitted(outcome))
    }

    /// Load the saved profile, prompt for anything it lacks, and save it.
    fn load_profile(&mut self) -> Result<SenderProfile> {
        let store = ProfileStore::new(&self.settings.profile_path);
        let name = file_name(store.path());
        let mut profile = match store.load()? {
            Some(profile) => {
                writeln!(self.out, "Loading {}...", name)?;
                profile
            }
            None => {
                writeln!(
                    self.out,
                    "Collecting user info to sign message. This will only happen the first time!"
                )?;
                SenderProfile::new()
            }
        };

        collect_missing_fields(&mut profile, self.prompter, self.out)?;

        writeln!(self.out, "Saving {}...", name)?;
        store.save(&profile)?;
        Ok(profile)
    }

    fn confirm_send(&mut self) -> Result<bool> {
        if !self.interactive {
            tracing::debug!("stdin is not a terminal, sending without confirmation");
            return Ok(true);
        }
        self.prompter.confirm("Send and save")
    }
}
