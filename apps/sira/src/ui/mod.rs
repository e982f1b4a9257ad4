//! Interactive terminal front end.
//!
//! Each loop turn drains auth events into the controller, prints the current
//! view and dispatches one user action. Generation runs under a spinner;
//! Ctrl-C while it runs drops the in-flight request and signs the user out.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use console::style;
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::GenerationClient;
use crate::models::form::FormField;
use crate::models::user::User;
use crate::render::to_terminal;
use crate::session::{AuthSubscription, SessionGate};
use crate::state::AppState;
use crate::view::model::{generating_label, Control};
use crate::view::{Completion, View, ViewController, ViewState};

const PREVIEW_CHARS: usize = 40;

/// Typed as the only line of a multi-line entry, empties the field.
const CLEAR_MARKER: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Edit(FormField),
    Submit,
    ShowResult,
    Export,
    SignOut,
    Quit,
}

pub async fn run(state: AppState) -> Result<()> {
    let mut controller = ViewController::new(state.config.language);

    if let Some(email) = &state.config.user_email {
        state.gate.sign_in(email);
    }
    let (subscription, mut events) = attach(state.gate.as_ref(), &mut controller);

    loop {
        while let Ok(event) = events.try_recv() {
            controller.on_auth_change(event);
        }

        let view = controller.view();
        print_status(&view);

        if view.state == ViewState::Unauthenticated {
            if sign_in_screen(&state)? {
                continue;
            }
            break;
        }

        let actions = menu(&view);
        let labels: Vec<&str> = actions.iter().map(|(label, _)| label.as_str()).collect();
        let choice = Select::new()
            .with_prompt("Choose an action")
            .items(&labels)
            .default(0)
            .interact()?;

        match actions[choice].1 {
            Action::Edit(field) => edit_field(&mut controller, field)?,
            Action::Submit => generate(&mut controller, &state).await?,
            Action::ShowResult => show_result(&view),
            Action::Export => {
                // Failures are recorded as the visible notice.
                if let Ok(path) = controller.export(&state.exporter, state.sink.as_ref()) {
                    println!("{}", style(format!("Saved {}", path.display())).green());
                }
            }
            Action::SignOut => {
                state.gate.sign_out();
                controller.sign_out();
            }
            Action::Quit => break,
        }
    }

    drop(subscription);
    info!("Session closed");
    Ok(())
}

/// Subscribes to `gate` and brings the controller in line with whoever is
/// already signed in. Later changes arrive on the returned channel.
fn attach(
    gate: &dyn SessionGate,
    controller: &mut ViewController,
) -> (AuthSubscription, UnboundedReceiver<Option<User>>) {
    let (events_tx, events) = mpsc::unbounded_channel::<Option<User>>();
    let subscription = gate.on_auth_change(Arc::new(move |user: Option<&User>| {
        let _ = events_tx.send(user.cloned());
    }));
    controller.on_auth_change(gate.current_user());
    (subscription, events)
}

fn sign_in_screen(state: &AppState) -> Result<bool> {
    let choice = Select::new()
        .with_prompt("You are signed out")
        .items(&["Sign in", "Quit"])
        .default(0)
        .interact()?;
    if choice == 1 {
        return Ok(false);
    }

    let email: String = Input::new()
        .with_prompt("Email")
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.contains('@') {
                Ok(())
            } else {
                Err("Enter an email address")
            }
        })
        .interact_text()?;
    state.gate.sign_in(&email);
    Ok(true)
}

fn edit_field(controller: &mut ViewController, field: FormField) -> Result<()> {
    let label = field.label(controller.language());
    let current = controller.form().get(field).to_string();

    let value = if field.is_multiline() {
        read_multiline(label, &current)?
    } else {
        Input::<String>::new()
            .with_prompt(label)
            .with_initial_text(current)
            .allow_empty(true)
            .interact_text()?
    };

    // Only refused when signed out, and the refusal becomes the notice.
    let _ = controller.set_field(field, value);
    Ok(())
}

/// Reads lines until an empty one.
fn read_multiline(label: &str, current: &str) -> Result<String> {
    println!(
        "{}",
        style(format!(
            "{label}: one line at a time, empty line to finish. Finish right away to keep \
             the current text, or enter a single '{CLEAR_MARKER}' to clear it."
        ))
        .dim()
    );

    let mut lines = Vec::new();
    loop {
        let line: String = Input::new()
            .with_prompt(format!("{label} {}", lines.len() + 1))
            .allow_empty(true)
            .interact_text()?;
        if line.trim().is_empty() {
            break;
        }
        lines.push(line);
    }

    Ok(multiline_value(&lines, current))
}

/// No lines keeps `current`; a lone clear marker empties the field.
fn multiline_value(lines: &[String], current: &str) -> String {
    match lines {
        [] => current.to_string(),
        [only] if only.trim() == CLEAR_MARKER => String::new(),
        _ => lines.join("\n"),
    }
}

async fn generate(controller: &mut ViewController, state: &AppState) -> Result<()> {
    // Refusals go straight to the notice; no spinner for those.
    let spinner = if controller.form().is_complete() {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
        spinner.set_message(generating_label(controller.language()));
        spinner.enable_steady_tick(Duration::from_millis(120));
        Some(spinner)
    } else {
        None
    };

    let outcome = submit_until(controller, state.client.as_ref(), ctrl_c()).await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    match outcome {
        Some(Ok(Completion::Ready)) => show_result(&controller.view()),
        // Failures are already the visible notice.
        Some(_) => {}
        None => {
            println!("{}", style("Interrupted: signing out.").yellow());
            state.gate.sign_out();
            controller.sign_out();
        }
    }
    Ok(())
}

/// Runs one submit unless `interrupt` fires first, in which case the request
/// is dropped mid-flight and `None` comes back.
async fn submit_until(
    controller: &mut ViewController,
    client: &dyn GenerationClient,
    interrupt: impl Future<Output = ()>,
) -> Option<Result<Completion, AppError>> {
    tokio::select! {
        outcome = controller.submit(client) => Some(outcome),
        _ = interrupt => None,
    }
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

fn print_status(view: &View) {
    println!();
    let who = view.user_email.as_deref().unwrap_or("not signed in");
    println!("{}", style(format!("Sira CV builder: {who}")).bold());
    if let Some(notice) = &view.notice {
        println!("{}", style(format!("[{}] {}", notice.code, notice.message)).red());
    }
    if let Some(path) = &view.last_export {
        println!("{}", style(format!("Last export: {}", path.display())).dim());
    }
}

fn show_result(view: &View) {
    if let Some(markdown) = &view.result_markdown {
        println!();
        println!("{}", to_terminal(markdown));
    }
}

fn menu(view: &View) -> Vec<(String, Action)> {
    let mut items: Vec<(String, Action)> = view
        .fields
        .iter()
        .map(|f| {
            let marker = if f.missing { "*" } else { " " };
            (
                format!("{marker} {}: {}", f.label, preview(&f.value)),
                Action::Edit(f.field),
            )
        })
        .collect();

    items.push((control_label(&view.submit), Action::Submit));
    if view.result_markdown.is_some() {
        items.push(("Show generated CV".to_string(), Action::ShowResult));
    }
    items.push((control_label(&view.export), Action::Export));
    items.push(("Sign out".to_string(), Action::SignOut));
    items.push(("Quit".to_string(), Action::Quit));
    items
}

fn control_label(control: &Control) -> String {
    if control.enabled {
        control.label.to_string()
    } else {
        format!("{} (unavailable)", control.label)
    }
}

/// First line of `value`, cut to a menu-friendly length.
fn preview(value: &str) -> String {
    let first = value.lines().next().unwrap_or("").trim();
    let mut out: String = first.chars().take(PREVIEW_CHARS).collect();
    if first.chars().count() > PREVIEW_CHARS || value.trim().lines().count() > 1 {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::llm_client::GenerationError;
    use crate::models::generation::{GenerationRequest, GenerationResult};
    use crate::models::language::Language;
    use crate::session::LocalSessionGate;
    use crate::view::controller::tests::{filled, signed_in, ScriptedClient, SARA_CV};

    #[test]
    fn test_preview_truncates_long_and_multiline_values() {
        assert_eq!(preview(""), "");
        assert_eq!(preview("Sara"), "Sara");
        assert_eq!(preview("BSc\nMSc"), "BSc…");
        let long = "x".repeat(60);
        assert_eq!(preview(&long), format!("{}…", "x".repeat(PREVIEW_CHARS)));
    }

    #[test]
    fn test_menu_for_empty_form() {
        let items = menu(&signed_in().view());
        let actions: Vec<Action> = items.iter().map(|(_, a)| *a).collect();

        assert_eq!(actions.len(), 12);
        assert_eq!(actions[0], Action::Edit(FormField::Name));
        assert!(items[0].0.starts_with('*'));
        assert_eq!(items[8], ("Generate CV (unavailable)".to_string(), Action::Submit));
        assert!(!actions.contains(&Action::ShowResult));
        assert_eq!(items[9].0, "Download as Word document (unavailable)");
        assert_eq!(actions[10..], [Action::SignOut, Action::Quit]);
    }

    #[test]
    fn test_menu_after_generation_offers_result_and_export() {
        let mut controller = signed_in();
        filled(&mut controller);
        let ticket = controller.begin_generation().unwrap().unwrap();
        controller
            .complete_generation(ticket, Ok(GenerationResult::new(SARA_CV)))
            .unwrap();

        let items = menu(&controller.view());

        assert!(items.iter().all(|(label, _)| !label.contains("unavailable")));
        assert!(items.contains(&("Regenerate CV".to_string(), Action::Submit)));
        assert!(items.contains(&("Show generated CV".to_string(), Action::ShowResult)));
        assert!(items.contains(&("Download as Word document".to_string(), Action::Export)));
    }

    #[test]
    fn test_multiline_value_keeps_replaces_or_clears() {
        let lines = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        assert_eq!(multiline_value(&[], "BSc"), "BSc");
        assert_eq!(multiline_value(&lines(&["BSc", "MSc"]), "old"), "BSc\nMSc");
        assert_eq!(multiline_value(&lines(&[" - "]), "BSc"), "");
        assert_eq!(multiline_value(&lines(&["-", "MSc"]), "BSc"), "-\nMSc");
    }

    #[test]
    fn test_attach_picks_up_user_signed_in_before_subscribing() {
        let gate = LocalSessionGate::new();
        let user = gate.sign_in("sara@example.com");
        let mut controller = ViewController::new(Language::English);

        let (_subscription, mut events) = attach(&gate, &mut controller);

        assert_eq!(controller.state(), ViewState::Idle);
        assert_eq!(controller.user().map(|u| u.id), Some(user.id));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_attach_forwards_later_auth_changes() {
        let gate = LocalSessionGate::new();
        let mut controller = ViewController::new(Language::English);

        let (_subscription, mut events) = attach(&gate, &mut controller);
        assert_eq!(controller.state(), ViewState::Unauthenticated);

        gate.sign_in("sara@example.com");
        while let Ok(event) = events.try_recv() {
            controller.on_auth_change(event);
        }
        assert_eq!(controller.state(), ViewState::Idle);

        gate.sign_out();
        while let Ok(event) = events.try_recv() {
            controller.on_auth_change(event);
        }
        assert_eq!(controller.state(), ViewState::Unauthenticated);
    }

    /// Never answers; records when its request is dropped.
    struct HangingClient {
        dropped: Arc<AtomicBool>,
    }

    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl GenerationClient for HangingClient {
        fn provider(&self) -> &'static str {
            "hanging"
        }

        async fn generate(
            &self,
            _request: &GenerationRequest,
        ) -> Result<GenerationResult, GenerationError> {
            let _flag = DropFlag(Arc::clone(&self.dropped));
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_interrupt_drops_in_flight_request() {
        let dropped = Arc::new(AtomicBool::new(false));
        let client = HangingClient {
            dropped: Arc::clone(&dropped),
        };
        let mut controller = signed_in();
        filled(&mut controller);

        // Yields once, so the request is started before the interrupt fires.
        let outcome = submit_until(&mut controller, &client, tokio::task::yield_now()).await;

        assert!(outcome.is_none());
        assert!(dropped.load(Ordering::SeqCst));
        controller.sign_out();
        assert_eq!(controller.state(), ViewState::Unauthenticated);
        assert!(controller.result().is_none());
    }

    #[tokio::test]
    async fn test_submit_completes_without_interrupt() {
        let client = ScriptedClient::new(&[Some(SARA_CV)]);
        let mut controller = signed_in();
        filled(&mut controller);

        let outcome = submit_until(&mut controller, &client, std::future::pending()).await;

        assert_eq!(outcome.unwrap().unwrap(), Completion::Ready);
        assert_eq!(client.calls(), 1);
        assert_eq!(controller.result().unwrap().as_str(), SARA_CV);
    }
}
