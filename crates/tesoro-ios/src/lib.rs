//! C ABI for embedding the Tesoro Value Wall in a Swift/UIKit app.
//!
//! Every entry point must be called from the main thread. Strings cross the
//! boundary as UTF-8 pointer+length pairs; booleans as `i32`.

use std::ffi::{c_char, c_void};

use tesoro_core::{
    Color, Metadata, Mode, PresentationOptions, ReplacementPolicy, SdkConfig, SdkSettings,
    SurfaceEvent, SurfaceHandle, Tesoro,
};

mod host;

pub use host::{CallbackHost, HostAnchorResolver, HostScreen, TesoroHostCallbacks};

/// Opaque SDK state handed to Swift.
pub struct TesoroIosState {
    sdk: Tesoro<CallbackHost, HostAnchorResolver>,
}

impl TesoroIosState {
    pub fn new(callbacks: TesoroHostCallbacks, policy: ReplacementPolicy) -> Self {
        let settings = SdkSettings {
            replacement_policy: policy,
        };
        Self {
            sdk: Tesoro::with_settings(
                CallbackHost::new(callbacks),
                HostAnchorResolver::new(callbacks),
                settings,
            ),
        }
    }

    fn read_utf8_string(ptr: *const u8, len: usize) -> String {
        if ptr.is_null() || len == 0 {
            return String::new();
        }

        // SAFETY: Caller provides pointer+length pair from FFI boundary.
        // Null/empty is checked above; invalid UTF-8 is handled lossily.
        let bytes = unsafe { std::slice::from_raw_parts(ptr, len) };
        String::from_utf8_lossy(bytes).into_owned()
    }

    fn configure_utf8(
        &mut self,
        mode: u8,
        player_ptr: *const u8,
        player_len: usize,
        metadata_ptr: *const u8,
        metadata_len: usize,
    ) -> bool {
        let player_id = Self::read_utf8_string(player_ptr, player_len);
        let metadata_json = Self::read_utf8_string(metadata_ptr, metadata_len);
        let metadata = if metadata_json.trim().is_empty() {
            None
        } else {
            match serde_json::from_str::<Metadata>(&metadata_json) {
                Ok(metadata) => Some(metadata),
                Err(error) => {
                    tracing::error!(
                        error = %error,
                        "configure: metadata must be a JSON object of strings"
                    );
                    return false;
                }
            }
        };
        self.sdk.configure(Mode::from_u8(mode), player_id, metadata);
        true
    }

    fn configure_json_utf8(&mut self, ptr: *const u8, len: usize) -> bool {
        let raw = Self::read_utf8_string(ptr, len);
        match SdkConfig::from_json_str(&raw) {
            Ok(config) => {
                self.sdk.configure_from(config);
                true
            }
            Err(error) => {
                tracing::error!(error = %error, "configure_json rejected");
                false
            }
        }
    }

    fn surface_event_utf8(
        &mut self,
        handle: u64,
        event: u8,
        message_ptr: *const u8,
        message_len: usize,
    ) -> bool {
        let message = Self::read_utf8_string(message_ptr, message_len);
        let Some(event) = SurfaceEvent::from_u8(event, message) else {
            tracing::warn!(event, "unknown surface event code");
            return false;
        };
        let handle = SurfaceHandle(handle);
        if event == SurfaceEvent::Closed {
            self.sdk.host_mut().complete_dismissals_for(handle);
        }
        self.sdk.handle_surface_event(handle, &event)
    }

    /// Copies the current Value Wall URL into `out` when it fits and returns
    /// its byte length; 0 when unconfigured.
    fn write_url(&self, out: *mut u8, capacity: usize) -> usize {
        let url = match self.sdk.value_wall_url() {
            Ok(url) => url,
            Err(error) => {
                tracing::debug!(error = %error, "build_url unavailable");
                return 0;
            }
        };
        let bytes = url.as_str().as_bytes();
        if !out.is_null() && capacity >= bytes.len() {
            // SAFETY: `out` is non-null and the host guarantees `capacity`
            // writable bytes; the copy length is bounded by `capacity`.
            unsafe { std::ptr::copy_nonoverlapping(bytes.as_ptr(), out, bytes.len()) };
        }
        bytes.len()
    }
}

fn close_button_options(has_color: i32, rgba: u32) -> PresentationOptions {
    if has_color == 0 {
        PresentationOptions::default()
    } else {
        PresentationOptions::with_close_button_color(Color::from_rgba_u32(rgba))
    }
}

fn replacement_policy_from_u8(value: u8) -> ReplacementPolicy {
    match value {
        1 => ReplacementPolicy::DismissPrevious,
        _ => ReplacementPolicy::KeepPrevious,
    }
}

fn as_u8_ptr(ptr: *const c_char) -> *const u8 {
    if ptr.is_null() {
        std::ptr::null()
    } else {
        ptr.cast::<u8>()
    }
}

unsafe fn ios_state_mut_unchecked<'a>(state: *mut TesoroIosState) -> &'a mut TesoroIosState {
    unsafe { &mut *state }
}

unsafe fn ios_state_ref_unchecked<'a>(state: *const TesoroIosState) -> &'a TesoroIosState {
    unsafe { &*state }
}

unsafe fn free_ios_state_unchecked(state: *mut TesoroIosState) -> Box<TesoroIosState> {
    unsafe { Box::from_raw(state) }
}

macro_rules! ios_state_mut {
    ($state:expr) => {{
        // SAFETY: all callers perform null checks before invoking this helper
        // and request unique mutable access through a single FFI entrypoint.
        unsafe { ios_state_mut_unchecked($state) }
    }};
}

macro_rules! ios_state_ref {
    ($state:expr) => {{
        // SAFETY: all callers perform null checks before invoking this helper
        // and only request shared access for read-only operations.
        unsafe { ios_state_ref_unchecked($state) }
    }};
}

macro_rules! ios_state_free {
    ($state:expr) => {{
        // SAFETY: all callers pass pointers created by `Box::into_raw`
        // from this module and free each pointer at most once.
        unsafe { free_ios_state_unchecked($state) }
    }};
}

/// C FFI: create SDK state from a host callback table (copied).
/// `replacement_policy`: keep previous=0, dismiss previous=1.
/// Returns null when `callbacks` is null.
#[unsafe(no_mangle)]
pub extern "C" fn tesoro_ios_create(
    callbacks: *const TesoroHostCallbacks,
    replacement_policy: u8,
) -> *mut TesoroIosState {
    if callbacks.is_null() {
        tracing::error!("create: callbacks is null");
        return std::ptr::null_mut();
    }
    // SAFETY: `callbacks` is null-checked above and points to a host-owned
    // table that is only read here; the table is copied into the state.
    let callbacks = unsafe { *callbacks };
    let policy = replacement_policy_from_u8(replacement_policy);
    tracing::debug!(?policy, "create");
    Box::into_raw(Box::new(TesoroIosState::new(callbacks, policy)))
}

/// C FFI: destroy state and free memory. Pending dismiss completions are
/// dropped without running.
#[unsafe(no_mangle)]
pub extern "C" fn tesoro_ios_destroy(state: *mut TesoroIosState) {
    if state.is_null() {
        return;
    }
    let _ = ios_state_free!(state);
}

/// mode: production=0 test=1. `metadata_json` is an optional JSON object of
/// string values (null/empty for none). Returns 1 on success, 0 on invalid
/// metadata (configuration is left unchanged).
#[unsafe(no_mangle)]
pub extern "C" fn tesoro_ios_configure(
    state: *mut TesoroIosState,
    mode: u8,
    player_id_ptr: *const c_char,
    player_id_len: usize,
    metadata_json_ptr: *const c_char,
    metadata_json_len: usize,
) -> i32 {
    if state.is_null() {
        return 0;
    }
    let state = ios_state_mut!(state);
    i32::from(state.configure_utf8(
        mode,
        as_u8_ptr(player_id_ptr),
        player_id_len,
        as_u8_ptr(metadata_json_ptr),
        metadata_json_len,
    ))
}

/// C FFI: configure from `{"mode":..,"player_id":..,"metadata":{..}}`.
#[unsafe(no_mangle)]
pub extern "C" fn tesoro_ios_configure_json(
    state: *mut TesoroIosState,
    json_ptr: *const c_char,
    json_len: usize,
) -> i32 {
    if state.is_null() {
        return 0;
    }
    let state = ios_state_mut!(state);
    i32::from(state.configure_json_utf8(as_u8_ptr(json_ptr), json_len))
}

#[unsafe(no_mangle)]
pub extern "C" fn tesoro_ios_reset(state: *mut TesoroIosState) {
    if state.is_null() {
        return;
    }
    let state = ios_state_mut!(state);
    state.sdk.reset();
}

#[unsafe(no_mangle)]
pub extern "C" fn tesoro_ios_is_configured(state: *mut TesoroIosState) -> i32 {
    if state.is_null() {
        return 0;
    }
    let state = ios_state_ref!(state);
    i32::from(state.sdk.is_configured())
}

/// Returns production=0 test=1, or -1 when unconfigured.
#[unsafe(no_mangle)]
pub extern "C" fn tesoro_ios_current_mode(state: *mut TesoroIosState) -> i32 {
    if state.is_null() {
        return -1;
    }
    let state = ios_state_ref!(state);
    state
        .sdk
        .current_mode()
        .map_or(-1, |mode| i32::from(mode.to_u8()))
}

/// C FFI: present the Value Wall. `has_color == 0` uses the label color.
/// Returns 1 when a presentation was initiated.
#[unsafe(no_mangle)]
pub extern "C" fn tesoro_ios_show_value_wall(
    state: *mut TesoroIosState,
    has_color: i32,
    rgba: u32,
) -> i32 {
    if state.is_null() {
        return 0;
    }
    let state = ios_state_mut!(state);
    let options = close_button_options(has_color, rgba);
    i32::from(state.sdk.show_value_wall(&options))
}

/// C FFI: dismiss the Value Wall. `completion(user_data)` runs after
/// teardown, or immediately when nothing is presented.
#[unsafe(no_mangle)]
pub extern "C" fn tesoro_ios_dismiss(
    state: *mut TesoroIosState,
    animated: i32,
    completion: Option<extern "C" fn(user_data: *mut c_void)>,
    user_data: *mut c_void,
) {
    if state.is_null() {
        return;
    }
    let state = ios_state_mut!(state);
    let completion = completion.map(|callback| {
        Box::new(move || callback(user_data)) as tesoro_core::DismissCompletion
    });
    state.sdk.dismiss(animated != 0, completion);
}

/// C FFI: acknowledge a dismiss started with a non-zero completion token.
/// Returns 1 when a pending completion ran.
#[unsafe(no_mangle)]
pub extern "C" fn tesoro_ios_dismiss_completed(state: *mut TesoroIosState, token: u64) -> i32 {
    if state.is_null() {
        return 0;
    }
    let state = ios_state_mut!(state);
    i32::from(state.sdk.host_mut().complete_dismissal(token))
}

/// event: load started=0 finished=1 failed=2 closed=3. `message` is only
/// read for failures. `closed` also runs dismiss completions still pending
/// for `handle`. Returns 1 when the event applied to the active surface.
#[unsafe(no_mangle)]
pub extern "C" fn tesoro_ios_surface_event(
    state: *mut TesoroIosState,
    handle: u64,
    event: u8,
    message_ptr: *const c_char,
    message_len: usize,
) -> i32 {
    if state.is_null() {
        return 0;
    }
    let state = ios_state_mut!(state);
    i32::from(state.surface_event_utf8(handle, event, as_u8_ptr(message_ptr), message_len))
}

#[unsafe(no_mangle)]
pub extern "C" fn tesoro_ios_is_presenting(state: *mut TesoroIosState) -> i32 {
    if state.is_null() {
        return 0;
    }
    let state = ios_state_ref!(state);
    i32::from(state.sdk.is_presenting())
}

#[unsafe(no_mangle)]
pub extern "C" fn tesoro_ios_is_loading(state: *mut TesoroIosState) -> i32 {
    if state.is_null() {
        return 0;
    }
    let state = ios_state_ref!(state);
    i32::from(state.sdk.is_loading())
}

/// Returns the active surface handle, or 0 when idle.
#[unsafe(no_mangle)]
pub extern "C" fn tesoro_ios_active_handle(state: *mut TesoroIosState) -> u64 {
    if state.is_null() {
        return 0;
    }
    let state = ios_state_ref!(state);
    state
        .sdk
        .active_presentation()
        .map_or(0, |active| active.handle.0)
}

/// C FFI: write the current Value Wall URL (not NUL-terminated) into `out`.
/// Returns the URL byte length; when it exceeds `capacity` nothing is
/// written and the caller retries with a larger buffer. 0 when unconfigured.
#[unsafe(no_mangle)]
pub extern "C" fn tesoro_ios_build_url(
    state: *mut TesoroIosState,
    out: *mut c_char,
    capacity: usize,
) -> usize {
    if state.is_null() {
        return 0;
    }
    let state = ios_state_ref!(state);
    state.write_url(out.cast::<u8>(), capacity)
}

/// C FFI: install a `tracing` subscriber writing to stderr, filtered by
/// `RUST_LOG` (default `info`). Returns 0 if one was already installed.
#[unsafe(no_mangle)]
pub extern "C" fn tesoro_ios_init_logging() -> i32 {
    let result = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
    i32::from(result.is_ok())
}

#[cfg(test)]
mod tests;
