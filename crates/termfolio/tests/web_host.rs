#![forbid(unsafe_code)]

//! The portfolio under the browser stepper: host-driven time and HTML output.

use std::time::Duration;

use termfolio::content::BOOT_LINES;
use termfolio::{ContentTable, TerminalApp, TerminalConfig};
use termfolio_core::event::{Event, KeyCode};
use termfolio_web::{StepProgram, WebError};

fn stepper() -> StepProgram<TerminalApp> {
    let app = TerminalApp::with_content(TerminalConfig::default(), ContentTable::portfolio());
    let mut program = StepProgram::new(app, 100, 30);
    program.init().expect("first init");
    program
}

fn settle(program: &mut StepProgram<TerminalApp>) {
    for _ in 0..10_000 {
        if !program.model().is_busy() {
            return;
        }
        program.advance_time(Duration::from_millis(16));
        program.step().expect("step");
    }
    panic!("reveal never finished");
}

fn submit(program: &mut StepProgram<TerminalApp>, text: &str) {
    for ch in text.chars() {
        program.push_event(Event::key(KeyCode::Char(ch)));
    }
    program.push_event(Event::key(KeyCode::Enter));
    program.step().expect("step");
}

#[test]
fn boot_follows_the_host_clock() {
    let mut program = stepper();
    let result = program.step().expect("step");
    assert_eq!(result.timers_fired, 0);
    assert_eq!(program.model().log().texts(), vec![""]);

    // A single large step catches up on every tick that was due.
    program.advance_time(Duration::from_secs(10));
    let result = program.step().expect("step");
    assert!(result.timers_fired > 0);
    assert!(result.rendered);
    assert_eq!(program.model().log().texts(), BOOT_LINES.to_vec());
    assert_eq!(program.active_timers(), 0);
}

#[test]
fn links_render_as_safe_anchors() {
    let mut program = stepper();
    settle(&mut program);
    submit(&mut program, "contact");
    settle(&mut program);

    let html = program.outputs().last_html.clone().expect("rendered");
    assert!(html.contains(
        "<a href=\"https://github.com/man9opie\" target=\"_blank\" rel=\"noopener noreferrer\" class=\"terminal-link\""
    ));
    assert!(html.contains("https://www.linkedin.com/in/andi-chen-9b0414238/"));
    assert!(html.contains("class=\"terminal-line\""));
}

#[test]
fn reveal_after_an_idle_gap_is_still_paced() {
    let mut program = stepper();
    settle(&mut program);
    let booted = program.model().log().len();

    // The host stops stepping while idle, then input arrives much later.
    program.advance_time(Duration::from_secs(5));
    submit(&mut program, "help");
    assert!(program.model().is_busy());
    let texts = program.model().log().texts();
    assert_eq!(texts.len(), booted + 2);
    assert_eq!(texts.last().copied(), Some(""));

    program.advance_time(Duration::from_millis(15));
    let result = program.step().expect("step");
    assert_eq!(result.timers_fired, 1);
    assert_eq!(program.model().log().texts().last().copied(), Some("A"));
}

#[test]
fn frame_json_is_published_with_the_html() {
    let mut program = stepper();
    let outputs = program.take_outputs();
    let json = outputs.last_frame_json.expect("init renders");
    assert!(json.starts_with('{'));
    assert!(outputs.last_html.is_some());
}

#[test]
fn teardown_stops_ticks_and_later_steps() {
    let mut program = stepper();
    program.advance_time(Duration::from_millis(100));
    program.step().expect("step");
    let shown = program.model().log().texts().join("\n");

    program.teardown();
    assert_eq!(program.active_timers(), 0);
    assert!(program.model().is_shut_down());

    program.advance_time(Duration::from_secs(10));
    let result = program.step().expect("step after teardown");
    assert!(!result.running);
    assert_eq!(result.timers_fired, 0);
    assert_eq!(program.model().log().texts().join("\n"), shown);
    program.teardown();
}

#[test]
fn second_init_is_an_error() {
    let mut program = stepper();
    assert!(matches!(program.init(), Err(WebError::AlreadyInitialized)));
}
