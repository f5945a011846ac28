use std::collections::HashMap;
use std::ffi::{c_char, c_void};

use tesoro_core::anchor::topmost_screen;
use tesoro_core::{
    AnchorResolver, ContainerKind, DismissCompletion, HostError, ScreenContainer, SurfaceHandle,
    SurfaceRequest, WebSurfaceHost,
};

/// Host-side callbacks supplied by Swift.
///
/// Screen and surface ids are opaque non-zero values chosen by the host;
/// 0 means "none" (or, from `present`, "failed"). Callbacks run on the
/// caller's thread and must not re-enter any `tesoro_ios_*` function for the
/// same state; defer such calls to the next main-queue turn.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct TesoroHostCallbacks {
    pub context: *mut c_void,
    /// Display a web surface for `url` from `anchor`. `has_color == 0` means
    /// use the platform label color; otherwise `rgba` is `0xRRGGBBAA`.
    pub present: Option<
        extern "C" fn(
            context: *mut c_void,
            anchor: u64,
            url_ptr: *const c_char,
            url_len: usize,
            has_color: i32,
            rgba: u32,
        ) -> u64,
    >,
    /// Tear down `handle`. When `completion_token != 0` the host calls
    /// `tesoro_ios_dismiss_completed` with it once teardown finishes. A
    /// `closed` surface event for `handle` settles any token still pending.
    pub dismiss: Option<
        extern "C" fn(context: *mut c_void, handle: u64, animated: i32, completion_token: u64),
    >,
    pub root_screen: Option<extern "C" fn(context: *mut c_void) -> u64>,
    /// plain=0 navigation=1 tabs=2
    pub screen_kind: Option<extern "C" fn(context: *mut c_void, screen: u64) -> u8>,
    pub presented_screen: Option<extern "C" fn(context: *mut c_void, screen: u64) -> u64>,
    /// Visible screen of a navigation stack or selected screen of a tab set.
    pub focused_screen: Option<extern "C" fn(context: *mut c_void, screen: u64) -> u64>,
}

fn non_zero(id: u64) -> Option<u64> {
    (id != 0).then_some(id)
}

/// A node of the host's screen tree, walked through the callbacks.
#[derive(Clone, Copy)]
pub struct HostScreen {
    pub id: u64,
    callbacks: TesoroHostCallbacks,
}

impl HostScreen {
    fn related(&self, relation: Option<extern "C" fn(*mut c_void, u64) -> u64>) -> Option<Self> {
        let relation = relation?;
        non_zero(relation(self.callbacks.context, self.id)).map(|id| Self {
            id,
            callbacks: self.callbacks,
        })
    }
}

impl ScreenContainer for HostScreen {
    fn kind(&self) -> ContainerKind {
        self.callbacks
            .screen_kind
            .map_or(ContainerKind::Plain, |kind| {
                ContainerKind::from_u8(kind(self.callbacks.context, self.id))
            })
    }

    fn presented(&self) -> Option<Self> {
        self.related(self.callbacks.presented_screen)
    }

    fn focused_child(&self) -> Option<Self> {
        self.related(self.callbacks.focused_screen)
    }
}

pub struct HostAnchorResolver {
    callbacks: TesoroHostCallbacks,
}

impl HostAnchorResolver {
    pub fn new(callbacks: TesoroHostCallbacks) -> Self {
        Self { callbacks }
    }
}

impl AnchorResolver for HostAnchorResolver {
    type Anchor = HostScreen;

    fn resolve_anchor(&self) -> Option<HostScreen> {
        let root_screen = self.callbacks.root_screen?;
        let root = non_zero(root_screen(self.callbacks.context))?;
        Some(topmost_screen(HostScreen {
            id: root,
            callbacks: self.callbacks,
        }))
    }
}

/// `WebSurfaceHost` backed by the Swift callback table.
///
/// Dismiss completions stay on the Rust side, keyed by token, until the host
/// acknowledges teardown or reports the surface closed.
pub struct CallbackHost {
    callbacks: TesoroHostCallbacks,
    next_token: u64,
    pending_completions: HashMap<u64, (SurfaceHandle, DismissCompletion)>,
}

impl CallbackHost {
    pub fn new(callbacks: TesoroHostCallbacks) -> Self {
        Self {
            callbacks,
            next_token: 0,
            pending_completions: HashMap::new(),
        }
    }

    /// Runs and forgets the completion for `token`. Returns `false` for an
    /// unknown or already completed token.
    pub fn complete_dismissal(&mut self, token: u64) -> bool {
        match self.pending_completions.remove(&token) {
            Some((_, completion)) => {
                completion();
                true
            }
            None => {
                tracing::debug!(token, "unknown dismiss completion token");
                false
            }
        }
    }

    /// Runs, in dismiss order, every pending completion for a surface the
    /// host reported closed.
    pub fn complete_dismissals_for(&mut self, handle: SurfaceHandle) -> usize {
        let mut tokens: Vec<u64> = self
            .pending_completions
            .iter()
            .filter(|(_, (pending, _))| *pending == handle)
            .map(|(token, _)| *token)
            .collect();
        tokens.sort_unstable();
        for token in &tokens {
            if let Some((_, completion)) = self.pending_completions.remove(token) {
                completion();
            }
        }
        if !tokens.is_empty() {
            tracing::debug!(
                %handle,
                settled = tokens.len(),
                "surface closed with dismissals pending"
            );
        }
        tokens.len()
    }

    pub fn pending_dismissals(&self) -> usize {
        self.pending_completions.len()
    }
}

impl WebSurfaceHost for CallbackHost {
    type Anchor = HostScreen;

    fn present(
        &mut self,
        anchor: &HostScreen,
        request: &SurfaceRequest,
    ) -> Result<SurfaceHandle, HostError> {
        let present = self
            .callbacks
            .present
            .ok_or_else(|| HostError::new("present callback missing"))?;
        let url = request.url.as_str();
        let (has_color, rgba) = match request.close_button_color.to_rgba_u32() {
            Some(rgba) => (1, rgba),
            None => (0, 0),
        };

        let handle = present(
            self.callbacks.context,
            anchor.id,
            url.as_ptr().cast::<c_char>(),
            url.len(),
            has_color,
            rgba,
        );
        non_zero(handle)
            .map(SurfaceHandle)
            .ok_or_else(|| HostError::new("host returned no surface"))
    }

    fn dismiss(
        &mut self,
        handle: SurfaceHandle,
        animated: bool,
        completion: Option<DismissCompletion>,
    ) {
        let Some(dismiss) = self.callbacks.dismiss else {
            tracing::warn!(%handle, "dismiss callback missing; completing immediately");
            if let Some(completion) = completion {
                completion();
            }
            return;
        };

        let token = match completion {
            Some(completion) => {
                self.next_token += 1;
                self.pending_completions.insert(self.next_token, (handle, completion));
                self.next_token
            }
            None => 0,
        };
        dismiss(self.callbacks.context, handle.0, i32::from(animated), token);
    }
}
