// Library root
// -----------
// The binary (`main.rs`) wires these modules together; tests drive them
// directly.
//
// Module responsibilities:
// - `config`: endpoint and local file locations.
// - `telemetry`: diagnostic logging set-up.
// - `prompt`: operator questions (terminal, piped stdin, scripted).
// - `profile`: the sender's saved details and collecting missing ones.
// - `message`: picking, filling in and saving subject and message.
// - `api`: the contact form request and response.
// - `ui`: one complete run over the modules above.
pub mod api;
pub mod config;
pub mod message;
pub mod profile;
pub mod prompt;
pub mod telemetry;
pub mod ui;
