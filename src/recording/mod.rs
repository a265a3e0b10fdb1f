pub mod capture;
pub mod spectrum;
pub mod state;
pub mod ui;

pub use capture::CaptureSession;
pub use spectrum::SpectrumAnalyzer;
pub use state::{RecordingState, StateMachine, MIC_DENIED_MESSAGE, PROCESSING_FAILED_MESSAGE};
pub use ui::{RecorderTui, RecordingCommand, ResultCommand};
