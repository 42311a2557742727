//! Screen flow state machine.
//!
//! Screens carry their own payloads: the preview screen owns the captured
//! image and the data-input screen owns the pending product number, so a
//! screen can never exist without the data it needs. Saving drops the
//! payloads along with the screens that held them.
//!
//! Captures are numbered by a generation counter. A recognition result is
//! tagged with the generation it ran against and is discarded when a retake
//! happened in the meantime.

use image::RgbaImage;
use thiserror::Error;

/// Current screen plus the state it carries.
#[derive(Debug)]
pub enum Screen {
    Start,
    Camera,
    Preview { image: RgbaImage },
    DataInput { product_number: String },
    List,
}

/// Payload-free screen tag, for comparisons and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenKind {
    Start,
    Camera,
    Preview,
    DataInput,
    List,
}

impl std::fmt::Display for ScreenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScreenKind::Start => write!(f, "Start"),
            ScreenKind::Camera => write!(f, "Camera"),
            ScreenKind::Preview => write!(f, "Image preview"),
            ScreenKind::DataInput => write!(f, "Data input"),
            ScreenKind::List => write!(f, "Inventory list"),
        }
    }
}

/// Everything that can move the flow to another screen.
#[derive(Debug)]
pub enum FlowEvent {
    /// Start capturing: from the start screen, the list ("add new") or the
    /// data-input screen ("add more").
    BeginCapture,
    /// Open the saved list: from the start or data-input screens.
    ViewList,
    /// A still image was acquired on the camera screen.
    ImageAcquired(RgbaImage),
    /// Discard the previewed image and capture again.
    Retake,
    /// A product number is ready for entry: recognition output or manual
    /// entry on the preview screen. Stale generations are rejected.
    ProductNumberReady { generation: u64, product_number: String },
    /// The entry form saved successfully; carried state is dropped.
    Saved,
    /// Back navigation to the start screen.
    Cancel,
}

#[derive(Debug, Error, PartialEq)]
pub enum FlowError {
    #[error("{event} is not valid on the {screen} screen")]
    InvalidTransition {
        screen: ScreenKind,
        event: &'static str,
    },
    #[error("recognition result from an earlier capture was discarded")]
    StaleRecognition,
    #[error("the packaging unit overlay cannot open on the {0} screen")]
    ModalUnavailable(ScreenKind),
}

/// The session state machine. Runs for the lifetime of the session; no
/// screen is terminal.
pub struct ScreenFlow {
    screen: Screen,
    generation: u64,
    units_modal_open: bool,
}

impl Default for ScreenFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenFlow {
    pub fn new() -> Self {
        Self {
            screen: Screen::Start,
            generation: 0,
            units_modal_open: false,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn kind(&self) -> ScreenKind {
        match self.screen {
            Screen::Start => ScreenKind::Start,
            Screen::Camera => ScreenKind::Camera,
            Screen::Preview { .. } => ScreenKind::Preview,
            Screen::DataInput { .. } => ScreenKind::DataInput,
            Screen::List => ScreenKind::List,
        }
    }

    /// Generation of the most recent capture.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn units_modal_open(&self) -> bool {
        self.units_modal_open
    }

    /// Opens the packaging-unit overlay without leaving the current screen.
    pub fn open_units_modal(&mut self) -> Result<(), FlowError> {
        match self.kind() {
            ScreenKind::Start | ScreenKind::DataInput => {
                self.units_modal_open = true;
                Ok(())
            }
            other => Err(FlowError::ModalUnavailable(other)),
        }
    }

    pub fn close_units_modal(&mut self) {
        self.units_modal_open = false;
    }

    /// Applies one event, or reports why it is invalid on this screen.
    pub fn apply(&mut self, event: FlowEvent) -> Result<(), FlowError> {
        let next = match (&self.screen, event) {
            (Screen::Start | Screen::List | Screen::DataInput { .. }, FlowEvent::BeginCapture) => {
                Screen::Camera
            }
            (Screen::Start | Screen::DataInput { .. }, FlowEvent::ViewList) => Screen::List,
            (Screen::Camera, FlowEvent::ImageAcquired(image)) => {
                self.generation += 1;
                Screen::Preview { image }
            }
            (Screen::Preview { .. }, FlowEvent::Retake) => Screen::Camera,
            (
                Screen::Preview { .. },
                FlowEvent::ProductNumberReady {
                    generation,
                    product_number,
                },
            ) => {
                if generation != self.generation {
                    return Err(FlowError::StaleRecognition);
                }
                Screen::DataInput { product_number }
            }
            (Screen::DataInput { .. }, FlowEvent::Saved) => Screen::Start,
            (
                Screen::Camera | Screen::Preview { .. } | Screen::DataInput { .. } | Screen::List,
                FlowEvent::Cancel,
            ) => Screen::Start,
            (_, event) => {
                return Err(FlowError::InvalidTransition {
                    screen: self.kind(),
                    event: event_name(&event),
                });
            }
        };

        self.screen = next;
        Ok(())
    }
}

fn event_name(event: &FlowEvent) -> &'static str {
    match event {
        FlowEvent::BeginCapture => "begin capture",
        FlowEvent::ViewList => "view list",
        FlowEvent::ImageAcquired(_) => "image acquired",
        FlowEvent::Retake => "retake",
        FlowEvent::ProductNumberReady { .. } => "product number ready",
        FlowEvent::Saved => "save",
        FlowEvent::Cancel => "cancel",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> RgbaImage {
        RgbaImage::new(4, 4)
    }

    fn flow_at_preview() -> ScreenFlow {
        let mut flow = ScreenFlow::new();
        flow.apply(FlowEvent::BeginCapture).unwrap();
        flow.apply(FlowEvent::ImageAcquired(image())).unwrap();
        flow
    }

    #[test]
    fn test_happy_path_to_save() {
        let mut flow = flow_at_preview();
        assert_eq!(flow.kind(), ScreenKind::Preview);

        let generation = flow.generation();
        flow.apply(FlowEvent::ProductNumberReady {
            generation,
            product_number: "8801234567".to_string(),
        })
        .unwrap();

        match flow.screen() {
            Screen::DataInput { product_number } => assert_eq!(product_number, "8801234567"),
            other => panic!("unexpected screen: {:?}", other),
        }

        flow.apply(FlowEvent::Saved).unwrap();
        assert_eq!(flow.kind(), ScreenKind::Start);
        // Save dropped the carried image and number with their screens.
        assert!(matches!(flow.screen(), Screen::Start));
    }

    #[test]
    fn test_stale_recognition_discarded_after_retake() {
        let mut flow = flow_at_preview();
        let old_generation = flow.generation();

        flow.apply(FlowEvent::Retake).unwrap();
        flow.apply(FlowEvent::ImageAcquired(image())).unwrap();

        let result = flow.apply(FlowEvent::ProductNumberReady {
            generation: old_generation,
            product_number: "9999".to_string(),
        });
        assert_eq!(result, Err(FlowError::StaleRecognition));
        assert_eq!(flow.kind(), ScreenKind::Preview);

        // The current generation still goes through.
        let generation = flow.generation();
        flow.apply(FlowEvent::ProductNumberReady {
            generation,
            product_number: "9999".to_string(),
        })
        .unwrap();
        assert_eq!(flow.kind(), ScreenKind::DataInput);
    }

    #[test]
    fn test_add_more_returns_to_camera() {
        let mut flow = flow_at_preview();
        let generation = flow.generation();
        flow.apply(FlowEvent::ProductNumberReady {
            generation,
            product_number: "1234".to_string(),
        })
        .unwrap();

        flow.apply(FlowEvent::BeginCapture).unwrap();
        assert_eq!(flow.kind(), ScreenKind::Camera);
    }

    #[test]
    fn test_list_reachable_from_start_and_back() {
        let mut flow = ScreenFlow::new();
        flow.apply(FlowEvent::ViewList).unwrap();
        assert_eq!(flow.kind(), ScreenKind::List);
        flow.apply(FlowEvent::BeginCapture).unwrap();
        assert_eq!(flow.kind(), ScreenKind::Camera);
        flow.apply(FlowEvent::Cancel).unwrap();
        assert_eq!(flow.kind(), ScreenKind::Start);
    }

    #[test]
    fn test_image_required_for_preview() {
        let mut flow = ScreenFlow::new();
        // No way into preview without an acquired image: the only event
        // that builds the preview screen carries the image with it.
        assert!(matches!(
            flow.apply(FlowEvent::Retake),
            Err(FlowError::InvalidTransition { .. })
        ));
        assert_eq!(flow.kind(), ScreenKind::Start);
    }

    #[test]
    fn test_saved_invalid_outside_data_input() {
        let mut flow = ScreenFlow::new();
        assert!(matches!(
            flow.apply(FlowEvent::Saved),
            Err(FlowError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_generation_increments_per_capture() {
        let mut flow = ScreenFlow::new();
        assert_eq!(flow.generation(), 0);
        flow.apply(FlowEvent::BeginCapture).unwrap();
        flow.apply(FlowEvent::ImageAcquired(image())).unwrap();
        assert_eq!(flow.generation(), 1);
        flow.apply(FlowEvent::Retake).unwrap();
        flow.apply(FlowEvent::ImageAcquired(image())).unwrap();
        assert_eq!(flow.generation(), 2);
    }

    #[test]
    fn test_units_modal_only_on_start_and_data_input() {
        let mut flow = ScreenFlow::new();
        flow.open_units_modal().unwrap();
        assert!(flow.units_modal_open());
        // The underlying screen did not change.
        assert_eq!(flow.kind(), ScreenKind::Start);
        flow.close_units_modal();

        flow.apply(FlowEvent::BeginCapture).unwrap();
        assert_eq!(
            flow.open_units_modal(),
            Err(FlowError::ModalUnavailable(ScreenKind::Camera))
        );
    }
}
