use std::collections::HashMap;
use std::ffi::{c_char, c_void};

use super::*;

#[derive(Default)]
struct HostRecorder {
    next_handle: u64,
    refuse_present: bool,
    presented: Vec<(u64, String, i32, u32)>,
    dismissed: Vec<(u64, i32, u64)>,
    root: u64,
    // screen -> (kind, presented, focused)
    screens: HashMap<u64, (u8, u64, u64)>,
}

fn recorder<'a>(context: *mut c_void) -> &'a mut HostRecorder {
    // SAFETY: tests pass a pointer to a live, boxed `HostRecorder`.
    unsafe { &mut *context.cast::<HostRecorder>() }
}

extern "C" fn present(
    context: *mut c_void,
    anchor: u64,
    url_ptr: *const c_char,
    url_len: usize,
    has_color: i32,
    rgba: u32,
) -> u64 {
    let host = recorder(context);
    if host.refuse_present {
        return 0;
    }
    // SAFETY: the bridge passes the URL's own pointer and length.
    let bytes = unsafe { std::slice::from_raw_parts(url_ptr.cast::<u8>(), url_len) };
    let url = String::from_utf8_lossy(bytes).into_owned();
    host.next_handle += 1;
    host.presented.push((anchor, url, has_color, rgba));
    host.next_handle
}

extern "C" fn dismiss(context: *mut c_void, handle: u64, animated: i32, token: u64) {
    recorder(context).dismissed.push((handle, animated, token));
}

extern "C" fn root_screen(context: *mut c_void) -> u64 {
    recorder(context).root
}

extern "C" fn screen_kind(context: *mut c_void, screen: u64) -> u8 {
    recorder(context).screens.get(&screen).map_or(0, |node| node.0)
}

extern "C" fn presented_screen(context: *mut c_void, screen: u64) -> u64 {
    recorder(context).screens.get(&screen).map_or(0, |node| node.1)
}

extern "C" fn focused_screen(context: *mut c_void, screen: u64) -> u64 {
    recorder(context).screens.get(&screen).map_or(0, |node| node.2)
}

extern "C" fn count_completion(user_data: *mut c_void) {
    // SAFETY: tests pass a pointer to a live `u32` counter.
    unsafe { *user_data.cast::<u32>() += 1 };
}

fn callbacks(context: *mut HostRecorder) -> TesoroHostCallbacks {
    TesoroHostCallbacks {
        context: context.cast::<c_void>(),
        present: Some(present),
        dismiss: Some(dismiss),
        root_screen: Some(root_screen),
        screen_kind: Some(screen_kind),
        presented_screen: Some(presented_screen),
        focused_screen: Some(focused_screen),
    }
}

fn tab_navigation_tree() -> Box<HostRecorder> {
    let mut host = Box::new(HostRecorder {
        root: 1,
        ..HostRecorder::default()
    });
    host.screens.insert(1, (2, 0, 2));
    host.screens.insert(2, (1, 0, 3));
    host.screens.insert(3, (0, 0, 0));
    host
}

fn configure(state: *mut TesoroIosState, mode: u8, player_id: &str, metadata_json: &str) -> i32 {
    tesoro_ios_configure(
        state,
        mode,
        player_id.as_ptr().cast::<c_char>(),
        player_id.len(),
        metadata_json.as_ptr().cast::<c_char>(),
        metadata_json.len(),
    )
}

fn pending_dismissals(state: *mut TesoroIosState) -> usize {
    // SAFETY: tests pass a live state created by `tesoro_ios_create`.
    let state = unsafe { &*state };
    state.sdk.host().pending_dismissals()
}

fn build_url(state: *mut TesoroIosState) -> String {
    let len = tesoro_ios_build_url(state, std::ptr::null_mut(), 0);
    let mut buffer = vec![0_u8; len];
    let written = tesoro_ios_build_url(state, buffer.as_mut_ptr().cast::<c_char>(), buffer.len());
    assert_eq!(written, len);
    String::from_utf8(buffer).expect("utf8 url")
}

#[test]
fn null_state_is_tolerated_everywhere() {
    let state = std::ptr::null_mut();
    assert_eq!(tesoro_ios_is_configured(state), 0);
    assert_eq!(tesoro_ios_current_mode(state), -1);
    assert_eq!(tesoro_ios_show_value_wall(state, 0, 0), 0);
    assert_eq!(tesoro_ios_configure(state, 0, std::ptr::null(), 0, std::ptr::null(), 0), 0);
    assert_eq!(tesoro_ios_build_url(state, std::ptr::null_mut(), 0), 0);
    tesoro_ios_dismiss(state, 1, None, std::ptr::null_mut());
    tesoro_ios_reset(state);
    tesoro_ios_destroy(state);
    assert!(tesoro_ios_create(std::ptr::null(), 0).is_null());
}

#[test]
fn configure_and_build_url_through_c_abi() {
    let mut host = tab_navigation_tree();
    let table = callbacks(&mut *host);
    let state = tesoro_ios_create(&table, 0);

    assert_eq!(tesoro_ios_is_configured(state), 0);
    assert_eq!(configure(state, 0, "p2", r#"{"b":"2","a":"1"}"#), 1);
    assert_eq!(tesoro_ios_is_configured(state), 1);
    assert_eq!(tesoro_ios_current_mode(state), 0);
    assert_eq!(
        build_url(state),
        "https://valuewall.tesoroxp.com?playerId=p2&a=1&b=2"
    );

    tesoro_ios_destroy(state);
}

#[test]
fn invalid_metadata_leaves_configuration_unchanged() {
    let mut host = tab_navigation_tree();
    let table = callbacks(&mut *host);
    let state = tesoro_ios_create(&table, 0);

    assert_eq!(configure(state, 1, "p1", ""), 1);
    assert_eq!(configure(state, 0, "p2", "[1,2]"), 0);
    assert_eq!(tesoro_ios_current_mode(state), 1);
    assert_eq!(build_url(state), "https://test.valuewall.tesoroxp.com?playerId=p1");

    tesoro_ios_destroy(state);
}

#[test]
fn configure_json_accepts_sdk_config() {
    let mut host = tab_navigation_tree();
    let table = callbacks(&mut *host);
    let state = tesoro_ios_create(&table, 0);

    let json = r#"{"mode":"test","playerId":"p7","metadata":{"campaign":"summer2024"}}"#;
    assert_eq!(
        tesoro_ios_configure_json(state, json.as_ptr().cast::<c_char>(), json.len()),
        1
    );
    assert_eq!(
        build_url(state),
        "https://test.valuewall.tesoroxp.com?playerId=p7&campaign=summer2024"
    );

    let bad = "{";
    assert_eq!(
        tesoro_ios_configure_json(state, bad.as_ptr().cast::<c_char>(), bad.len()),
        0
    );

    tesoro_ios_destroy(state);
}

#[test]
fn show_presents_from_topmost_host_screen() {
    let mut host = tab_navigation_tree();
    let table = callbacks(&mut *host);
    let state = tesoro_ios_create(&table, 0);

    assert_eq!(tesoro_ios_show_value_wall(state, 0, 0), 0);
    assert_eq!(configure(state, 1, "p1", ""), 1);
    assert_eq!(tesoro_ios_show_value_wall(state, 1, 0x0000_ffff), 1);

    assert_eq!(
        host.presented,
        vec![(
            3,
            "https://test.valuewall.tesoroxp.com?playerId=p1".to_string(),
            1,
            0x0000_ffff
        )]
    );
    assert_eq!(tesoro_ios_is_presenting(state), 1);
    assert_eq!(tesoro_ios_is_loading(state), 1);
    assert_eq!(tesoro_ios_active_handle(state), 1);

    tesoro_ios_destroy(state);
}

#[test]
fn show_fails_without_root_screen_or_when_host_refuses() {
    let mut host = Box::new(HostRecorder::default());
    let table = callbacks(&mut *host);
    let state = tesoro_ios_create(&table, 0);
    assert_eq!(configure(state, 0, "p1", ""), 1);

    assert_eq!(tesoro_ios_show_value_wall(state, 0, 0), 0);

    host.root = 9;
    host.refuse_present = true;
    assert_eq!(tesoro_ios_show_value_wall(state, 0, 0), 0);
    assert_eq!(tesoro_ios_is_presenting(state), 0);

    tesoro_ios_destroy(state);
}

#[test]
fn dismiss_completion_runs_after_host_acknowledges_token() {
    let mut host = tab_navigation_tree();
    let table = callbacks(&mut *host);
    let state = tesoro_ios_create(&table, 0);
    assert_eq!(configure(state, 0, "p1", ""), 1);
    assert_eq!(tesoro_ios_show_value_wall(state, 0, 0), 1);

    let mut completions: u32 = 0;
    let counter = std::ptr::addr_of_mut!(completions).cast::<c_void>();
    tesoro_ios_dismiss(state, 1, Some(count_completion), counter);

    assert_eq!(tesoro_ios_is_presenting(state), 0);
    let (handle, animated, token) = host.dismissed[0];
    assert_eq!((handle, animated), (1, 1));
    assert_ne!(token, 0);
    assert_eq!(completions, 0);
    assert_eq!(pending_dismissals(state), 1);

    assert_eq!(tesoro_ios_dismiss_completed(state, token), 1);
    assert_eq!(completions, 1);
    assert_eq!(pending_dismissals(state), 0);
    assert_eq!(tesoro_ios_dismiss_completed(state, token), 0);

    tesoro_ios_destroy(state);
}

#[test]
fn closed_event_settles_unacknowledged_dismissal() {
    let mut host = tab_navigation_tree();
    let table = callbacks(&mut *host);
    let state = tesoro_ios_create(&table, 0);
    assert_eq!(configure(state, 0, "p1", ""), 1);
    assert_eq!(tesoro_ios_show_value_wall(state, 0, 0), 1);
    let handle = tesoro_ios_active_handle(state);

    let mut completions: u32 = 0;
    let counter = std::ptr::addr_of_mut!(completions).cast::<c_void>();
    tesoro_ios_dismiss(state, 1, Some(count_completion), counter);
    let (_, _, token) = host.dismissed[0];
    assert_eq!(pending_dismissals(state), 1);

    // Surface already gone: the host reports it closed instead of acking.
    assert_eq!(tesoro_ios_surface_event(state, handle, 3, std::ptr::null(), 0), 0);
    assert_eq!(completions, 1);
    assert_eq!(pending_dismissals(state), 0);
    assert_eq!(tesoro_ios_dismiss_completed(state, token), 0);
    assert_eq!(completions, 1);

    tesoro_ios_destroy(state);
}

#[test]
fn dismiss_while_idle_completes_immediately() {
    let mut host = tab_navigation_tree();
    let table = callbacks(&mut *host);
    let state = tesoro_ios_create(&table, 0);

    let mut completions: u32 = 0;
    let counter = std::ptr::addr_of_mut!(completions).cast::<c_void>();
    tesoro_ios_dismiss(state, 0, Some(count_completion), counter);

    assert_eq!(completions, 1);
    assert!(host.dismissed.is_empty());

    tesoro_ios_destroy(state);
}

#[test]
fn surface_events_drive_loading_and_close() {
    let mut host = tab_navigation_tree();
    let table = callbacks(&mut *host);
    let state = tesoro_ios_create(&table, 0);
    assert_eq!(configure(state, 0, "p1", ""), 1);
    assert_eq!(tesoro_ios_show_value_wall(state, 0, 0), 1);
    let handle = tesoro_ios_active_handle(state);

    let message = "offline";
    assert_eq!(
        tesoro_ios_surface_event(
            state,
            handle,
            2,
            message.as_ptr().cast::<c_char>(),
            message.len()
        ),
        1
    );
    assert_eq!(tesoro_ios_is_loading(state), 0);
    assert_eq!(tesoro_ios_surface_event(state, handle, 9, std::ptr::null(), 0), 0);
    assert_eq!(tesoro_ios_surface_event(state, handle + 1, 3, std::ptr::null(), 0), 0);
    assert_eq!(tesoro_ios_is_presenting(state), 1);

    assert_eq!(tesoro_ios_surface_event(state, handle, 3, std::ptr::null(), 0), 1);
    assert_eq!(tesoro_ios_is_presenting(state), 0);
    assert_eq!(tesoro_ios_active_handle(state), 0);

    tesoro_ios_destroy(state);
}

#[test]
fn dismiss_previous_policy_tears_down_first_surface() {
    let mut host = tab_navigation_tree();
    let table = callbacks(&mut *host);
    let state = tesoro_ios_create(&table, 1);
    assert_eq!(configure(state, 0, "p1", ""), 1);

    assert_eq!(tesoro_ios_show_value_wall(state, 0, 0), 1);
    assert_eq!(tesoro_ios_show_value_wall(state, 0, 0), 1);

    assert_eq!(host.dismissed, vec![(1, 0, 0)]);
    assert_eq!(tesoro_ios_active_handle(state), 2);

    tesoro_ios_destroy(state);
}

#[test]
fn reset_forgets_presentation_without_dismissing() {
    let mut host = tab_navigation_tree();
    let table = callbacks(&mut *host);
    let state = tesoro_ios_create(&table, 0);
    assert_eq!(configure(state, 0, "p1", ""), 1);
    assert_eq!(tesoro_ios_show_value_wall(state, 0, 0), 1);

    tesoro_ios_reset(state);

    assert_eq!(tesoro_ios_is_configured(state), 0);
    assert_eq!(tesoro_ios_current_mode(state), -1);
    assert_eq!(tesoro_ios_is_presenting(state), 0);
    assert_eq!(tesoro_ios_show_value_wall(state, 0, 0), 0);
    assert!(host.dismissed.is_empty());
    assert_eq!(tesoro_ios_build_url(state, std::ptr::null_mut(), 0), 0);

    tesoro_ios_destroy(state);
}
