use std::cell::Cell;
use std::rc::Rc;

use clap::ValueEnum;
use serde::Serialize;
use tesoro_core::{
    AnchorResolver, DismissCompletion, HostError, LoadState, PresentationOptions, SdkConfig,
    SdkSettings, SurfaceEvent, SurfaceHandle, SurfaceRequest, Tesoro, WebSurfaceHost,
};

pub const SIMULATED_ANCHOR: &str = "root";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Step {
    Configure,
    Show,
    LoadStarted,
    LoadFinished,
    LoadFailed,
    Close,
    Dismiss,
    Reset,
}

impl Step {
    fn as_str(self) -> &'static str {
        match self {
            Self::Configure => "configure",
            Self::Show => "show",
            Self::LoadStarted => "load_started",
            Self::LoadFinished => "load_finished",
            Self::LoadFailed => "load_failed",
            Self::Close => "close",
            Self::Dismiss => "dismiss",
            Self::Reset => "reset",
        }
    }
}

/// In-process host that logs what a real web view would have been asked
/// to do. Dismissals complete synchronously.
#[derive(Debug, Default)]
pub struct RecordingHost {
    next_handle: u64,
    last_presented: Option<SurfaceHandle>,
}

impl WebSurfaceHost for RecordingHost {
    type Anchor = String;

    fn present(
        &mut self,
        anchor: &String,
        request: &SurfaceRequest,
    ) -> Result<SurfaceHandle, HostError> {
        self.next_handle += 1;
        let handle = SurfaceHandle(self.next_handle);
        tracing::info!(
            %handle,
            %anchor,
            url = %request.url,
            color = %request.close_button_color,
            "present"
        );
        self.last_presented = Some(handle);
        Ok(handle)
    }

    fn dismiss(
        &mut self,
        handle: SurfaceHandle,
        animated: bool,
        completion: Option<DismissCompletion>,
    ) {
        tracing::info!(%handle, animated, "dismiss");
        if let Some(completion) = completion {
            completion();
        }
    }
}

pub struct FixedAnchor;

impl AnchorResolver for FixedAnchor {
    type Anchor = String;

    fn resolve_anchor(&self) -> Option<String> {
        Some(SIMULATED_ANCHOR.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    pub step: &'static str,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub configured: bool,
    pub presenting: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_state: Option<LoadState>,
}

/// Runs `steps` against a fresh SDK context. Load and close steps target the
/// most recently presented surface, which may no longer be tracked.
pub fn run_script(
    identity: &SdkConfig,
    settings: SdkSettings,
    options: &PresentationOptions,
    steps: &[Step],
) -> Vec<TranscriptEntry> {
    let mut tesoro = Tesoro::with_settings(RecordingHost::default(), FixedAnchor, settings);
    let mut transcript = Vec::with_capacity(steps.len());

    for step in steps {
        let (ok, detail) = match step {
            Step::Configure => {
                tesoro.configure_from(identity.clone());
                (true, None)
            }
            Step::Show => match tesoro.try_show_value_wall(options) {
                Ok(handle) => (true, Some(handle.to_string())),
                Err(error) => (false, Some(error.code().to_string())),
            },
            Step::LoadStarted => send_event(&mut tesoro, SurfaceEvent::LoadStarted),
            Step::LoadFinished => send_event(&mut tesoro, SurfaceEvent::LoadFinished),
            Step::LoadFailed => send_event(
                &mut tesoro,
                SurfaceEvent::LoadFailed {
                    message: "simulated load failure".to_string(),
                },
            ),
            Step::Close => send_event(&mut tesoro, SurfaceEvent::Closed),
            Step::Dismiss => {
                let completed = Rc::new(Cell::new(false));
                let flag = Rc::clone(&completed);
                tesoro.dismiss(true, Some(Box::new(move || flag.set(true))));
                (completed.get(), None)
            }
            Step::Reset => {
                tesoro.reset();
                (true, None)
            }
        };

        let active = tesoro.active_presentation();
        transcript.push(TranscriptEntry {
            step: step.as_str(),
            ok,
            detail,
            configured: tesoro.is_configured(),
            presenting: tesoro.is_presenting(),
            handle: active.map(|active| active.handle.0),
            load_state: active.map(|active| active.load_state),
        });
    }

    transcript
}

fn send_event(
    tesoro: &mut Tesoro<RecordingHost, FixedAnchor>,
    event: SurfaceEvent,
) -> (bool, Option<String>) {
    let Some(handle) = tesoro.host().last_presented else {
        return (false, Some("no_surface".to_string()));
    };
    let applied = tesoro.handle_surface_event(handle, &event);
    (applied, (!applied).then(|| "untracked_surface".to_string()))
}
