//! Application command handlers for voxlog.
//!
//! This module organizes command handling into separate submodules, each responsible for a specific
//! application command.
//!
//! # Commands
//! - `record`: Audio recording with spectrum visualization and transcription
//! - `transcribe`: Transcribe a pre-recorded audio file
//! - `history`: Print the transcription history and the running word total
//! - `config`: Open configuration file in user's preferred editor
//! - `list_devices`: List available audio input devices
//! - `logs`: Display recent log entries

pub mod config;
pub mod history;
pub mod list_devices;
pub mod logs;
pub mod record;
pub mod transcribe;

pub use config::handle_config;
pub use history::handle_history;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use record::handle_record;
pub use transcribe::handle_transcribe;
