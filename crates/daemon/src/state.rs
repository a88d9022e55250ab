//! Application context owned by the daemon event loop.

use crate::mirror::{MirrorOutcome, WindowMirror};
use edgebar_config::{Config, APP_NAME};
use edgebar_core_motion::{resolve_display, DisplayInfo, Frame, PointerOutcome, PointerSample, SidebarEngine};
use edgebar_ipc::{IpcCommand, IpcResponse, PointerPhase, WindowSummary};
use edgebar_platform_win32::{
    ForegroundHistory, HostWindow, PlatformQuery, Win32Error, WindowDiscovery, WindowId, WindowInfo,
};
use std::path::PathBuf;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Capacity of each subscriber stream before slow readers start lagging.
const HUB_CAPACITY: usize = 64;

/// Turns a native window id into a host window the mirror can drive.
pub type HostFactory = Box<dyn Fn(WindowId) -> Result<Box<dyn HostWindow>, Win32Error> + Send>;

/// Fan-out of pushed responses to subscribed IPC connections.
#[derive(Clone)]
pub struct Hub {
    config: broadcast::Sender<IpcResponse>,
    frames: broadcast::Sender<IpcResponse>,
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

impl Hub {
    pub fn new() -> Self {
        let (config, _) = broadcast::channel(HUB_CAPACITY);
        let (frames, _) = broadcast::channel(HUB_CAPACITY);
        Self { config, frames }
    }

    pub fn subscribe_config(&self) -> broadcast::Receiver<IpcResponse> {
        self.config.subscribe()
    }

    pub fn subscribe_frames(&self) -> broadcast::Receiver<IpcResponse> {
        self.frames.subscribe()
    }

    pub(crate) fn publish_config(&self, response: IpcResponse) {
        // No receivers is fine.
        let _ = self.config.send(response);
    }

    fn publish_frame(&self, frame: Frame) {
        if self.frames.receiver_count() > 0 {
            let _ = self.frames.send(IpcResponse::Frame { frame });
        }
    }
}

fn summary(window: WindowInfo) -> WindowSummary {
    WindowSummary {
        hwnd: window.hwnd,
        title: window.title,
        process_id: window.process_id,
        executable: window.executable,
    }
}

/// Blacklist from the configuration plus our own windows.
fn effective_blacklist(config: &Config) -> Vec<String> {
    let mut entries = config.behavior.blacklist.clone();
    entries.push(APP_NAME.to_string());
    entries
}

pub struct AppState<P> {
    engine: SidebarEngine,
    mirror: WindowMirror,
    discovery: WindowDiscovery<P>,
    config: Config,
    data_dir: PathBuf,
    displays: Vec<DisplayInfo>,
    hub: Hub,
    host_factory: HostFactory,
}

impl<P: PlatformQuery> AppState<P> {
    pub fn new(config: Config, data_dir: PathBuf, platform: P, own_pid: u32, host_factory: HostFactory, hub: Hub) -> Self {
        let mut history = ForegroundHistory::new(config.behavior.history_limit());
        history.set_blacklist(effective_blacklist(&config));
        let discovery = WindowDiscovery::new(platform, own_pid, history);

        let displays = discovery.displays();
        let work_area = resolve_display(config.transforms.display_index(), &displays);
        info!(
            displays = displays.len(),
            x = work_area.x,
            y = work_area.y,
            width = work_area.width,
            height = work_area.height,
            "Resolved work area"
        );

        let mut engine = SidebarEngine::new(config.transforms.geometry(), work_area);
        engine.set_speed(config.transforms.animation_speed());

        Self {
            engine,
            mirror: WindowMirror::new(),
            discovery,
            config,
            data_dir,
            displays,
            hub,
            host_factory,
        }
    }

    /// Advance animations and mirror the resulting frame.
    ///
    /// With no new frame, a frame the throttle held back earlier is applied
    /// instead, so a paused drag never leaves the window behind the panel.
    pub fn tick(&mut self, now_ms: f64) {
        if let Some(frame) = self.engine.tick(now_ms) {
            self.apply_frame(frame, now_ms);
        } else if self.mirror.flush(self.engine.work_area(), now_ms) == Some(MirrorOutcome::Destroyed) {
            let progress = self.engine.abort();
            debug!(progress, "Drag aborted, host window is gone");
        }
        self.forward_cursor();
    }

    /// A click-through window gets no mouse input, so the renderer cannot
    /// report the cursor coming back. Sample it here and lift click-through
    /// once it is over the interactive region again.
    fn forward_cursor(&mut self) {
        if !self.mirror.is_forwarding() {
            return;
        }
        let Some((x, y)) = self.discovery.cursor_position() else {
            return;
        };
        if self.engine.interactive_region().contains(x, y) {
            match self.mirror.set_ignore_mouse_events(false, true) {
                Ok(_) => debug!(x, y, "Cursor back over the sidebar"),
                Err(e) => warn!("Failed to toggle click-through: {}", e),
            }
        }
    }

    fn apply_frame(&mut self, frame: Frame, now_ms: f64) {
        match self.mirror.apply(&frame, self.engine.work_area(), now_ms) {
            MirrorOutcome::Destroyed => {
                let progress = self.engine.abort();
                debug!(progress, "Animation aborted, host window is gone");
            }
            _ => self.hub.publish_frame(frame),
        }
    }

    /// Re-read the monitor list and re-resolve the work area.
    pub fn refresh_displays(&mut self) {
        let displays = self.discovery.displays();
        if displays != self.displays {
            info!("Display configuration changed ({} display(s))", displays.len());
            self.displays = displays;
        }
        let work_area = resolve_display(self.config.transforms.display_index(), &self.displays);
        self.engine.set_work_area(work_area);
    }

    /// Sample the foreground window into the history.
    pub fn poll_foreground(&mut self) {
        if let Some(window) = self.discovery.poll_foreground() {
            debug!(hwnd = window.hwnd, title = %window.title, "Foreground changed");
        }
    }

    /// Replace the configuration. Geometry changes reach the next frame and
    /// every config subscriber.
    pub fn apply_config(&mut self, config: Config) {
        let transforms_changed = config.transforms != self.config.transforms;
        let blacklist_changed = config.behavior.blacklist != self.config.behavior.blacklist;
        self.config = config;

        if blacklist_changed {
            self.discovery.set_blacklist(effective_blacklist(&self.config));
        }
        if transforms_changed {
            self.engine.set_geometry_config(self.config.transforms.geometry());
            self.engine.set_speed(self.config.transforms.animation_speed());
            let work_area = resolve_display(self.config.transforms.display_index(), &self.displays);
            self.engine.set_work_area(work_area);
            self.hub.publish_config(self.config_changed());
            info!("Geometry configuration changed");
        }
    }

    fn config_changed(&self) -> IpcResponse {
        IpcResponse::ConfigChanged {
            transforms: self.config.transforms.clone(),
            geometry: self.config.transforms.geometry(),
            animation_speed: self.config.transforms.animation_speed(),
        }
    }

    fn state(&self) -> IpcResponse {
        let frame = self.engine.current_frame();
        IpcResponse::State {
            progress: frame.progress,
            phase: self.engine.phase(),
            window: frame.window,
            panel: frame.panel,
            interactive_region: self.engine.interactive_region(),
            work_area: self.engine.work_area(),
            attached: self.mirror.is_attached(),
        }
    }

    fn pointer(&mut self, phase: PointerPhase, sample: PointerSample, on_widget_control: bool, now_ms: f64) -> IpcResponse {
        let outcome = match phase {
            PointerPhase::Down => self.engine.pointer_down(sample, on_widget_control),
            PointerPhase::Move => self.engine.pointer_move(sample),
            PointerPhase::Up => self.engine.pointer_up(sample, now_ms),
            PointerPhase::Cancel => self.engine.pointer_cancel(now_ms),
        };
        if let PointerOutcome::Frame { frame } = outcome {
            self.apply_frame(frame, now_ms);
        }
        IpcResponse::Pointer { outcome }
    }

    /// Handle an IPC command.
    pub fn handle_command(&mut self, cmd: IpcCommand, now_ms: f64) -> IpcResponse {
        match cmd {
            IpcCommand::Attach { window_id } => match (self.host_factory)(window_id) {
                Ok(host) => match self.mirror.attach(host) {
                    Ok(()) => {
                        let frame = self.engine.current_frame();
                        self.apply_frame(frame, now_ms);
                        IpcResponse::Ok
                    }
                    Err(e) => IpcResponse::error(format!("Failed to attach window {}: {}", window_id, e)),
                },
                Err(e) => IpcResponse::error(format!("Failed to attach window {}: {}", window_id, e)),
            },
            IpcCommand::Pointer {
                phase,
                x,
                y,
                time_ms,
                on_widget_control,
            } => self.pointer(phase, PointerSample::new(x, y, time_ms), on_widget_control, now_ms),
            IpcCommand::Hover { x, y } => {
                let interactive = self.engine.interactive_region().contains(x, y);
                if let Err(e) = self.mirror.set_ignore_mouse_events(!interactive, true) {
                    warn!("Failed to toggle click-through: {}", e);
                }
                IpcResponse::Hover { interactive }
            }
            IpcCommand::RequestResize {
                width,
                height,
                y,
                animate,
            } => {
                self.engine.request_resize(width, height, y, animate, now_ms);
                IpcResponse::Ok
            }
            IpcCommand::RequestExpand => {
                self.engine.request_expand(now_ms);
                IpcResponse::Ok
            }
            IpcCommand::RequestCollapse => {
                self.engine.request_collapse(now_ms);
                IpcResponse::Ok
            }
            IpcCommand::SetIgnoreMouseEvents { ignore, forward } => {
                match self.mirror.set_ignore_mouse_events(ignore, forward) {
                    Ok(_) => IpcResponse::Ok,
                    Err(e) => IpcResponse::error(e.to_string()),
                }
            }
            IpcCommand::PreviewConfig { transforms } => {
                let mut config = self.config.clone();
                config.transforms = transforms;
                self.apply_config(config);
                IpcResponse::Ok
            }
            IpcCommand::ReloadConfig => match Config::load(&self.data_dir) {
                Ok(config) => {
                    self.apply_config(config);
                    info!("Configuration reloaded");
                    IpcResponse::Ok
                }
                Err(e) => IpcResponse::error(format!("Failed to reload config: {}", e)),
            },
            IpcCommand::Subscribe { .. } => self.config_changed(),
            IpcCommand::QueryState => self.state(),
            IpcCommand::FindWindows { keywords } => IpcResponse::Windows {
                windows: self.discovery.find_windows(&keywords).into_iter().map(summary).collect(),
            },
            IpcCommand::CloseLastWindow => IpcResponse::Closed {
                window: self.discovery.close_last_window().map(summary),
            },
            IpcCommand::KillConflicting { keywords } => {
                let keywords = keywords.unwrap_or_else(|| self.config.behavior.conflicting_software.clone());
                IpcResponse::Killed {
                    pids: self.discovery.kill_conflicting(&keywords),
                }
            }
            IpcCommand::SetBlacklist { mut entries } => {
                entries.push(APP_NAME.to_string());
                self.discovery.set_blacklist(entries);
                IpcResponse::Ok
            }
            IpcCommand::Stop => {
                info!("Stop command received");
                IpcResponse::Ok
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mirror::tests::SharedHost;
    use edgebar_config::Transforms;
    use edgebar_core_motion::{Decision, EnginePhase, Rect};
    use std::cell::RefCell;
    use std::sync::atomic::Ordering;

    #[derive(Default)]
    struct FakePlatform {
        windows: Vec<WindowInfo>,
        foreground: RefCell<Option<WindowInfo>>,
        displays: RefCell<Vec<DisplayInfo>>,
        closed: RefCell<Vec<WindowId>>,
        terminated: RefCell<Vec<u32>>,
        cursor: RefCell<Option<(f64, f64)>>,
    }

    impl PlatformQuery for FakePlatform {
        fn enumerate_windows(&self) -> Result<Vec<WindowInfo>, Win32Error> {
            Ok(self.windows.clone())
        }

        fn foreground_window(&self) -> Result<Option<WindowInfo>, Win32Error> {
            Ok(self.foreground.borrow().clone())
        }

        fn close_window(&self, hwnd: WindowId) -> Result<(), Win32Error> {
            self.closed.borrow_mut().push(hwnd);
            Ok(())
        }

        fn terminate_process(&self, pid: u32) -> Result<(), Win32Error> {
            self.terminated.borrow_mut().push(pid);
            Ok(())
        }

        fn is_process_alive(&self, _pid: u32) -> bool {
            true
        }

        fn enumerate_displays(&self) -> Result<Vec<DisplayInfo>, Win32Error> {
            Ok(self.displays.borrow().clone())
        }

        fn cursor_position(&self) -> Result<(f64, f64), Win32Error> {
            (*self.cursor.borrow()).ok_or(Win32Error::Unsupported("cursor position"))
        }
    }

    const OWN_PID: u32 = 42;

    fn window(hwnd: u64, title: &str, pid: u32) -> WindowInfo {
        WindowInfo {
            hwnd,
            title: title.to_string(),
            process_id: pid,
            executable: format!("{}.exe", title.to_lowercase()),
        }
    }

    fn display(id: u64, x: i32, primary: bool) -> DisplayInfo {
        DisplayInfo {
            id,
            bounds: Rect::new(x, 0, 1920, 1080),
            work_area: Rect::new(x, 0, 1920, 1040),
            is_primary: primary,
            name: format!("DISPLAY{}", id),
        }
    }

    fn platform() -> FakePlatform {
        FakePlatform {
            windows: vec![
                window(1, "Steam", 100),
                window(2, "Discord", 200),
                window(3, "Steam Overlay", OWN_PID),
            ],
            displays: RefCell::new(vec![display(1, 0, true)]),
            ..Default::default()
        }
    }

    fn state_with(config: Config) -> (AppState<FakePlatform>, SharedHost, Hub) {
        let host = SharedHost::default();
        let factory_host = host.clone();
        let factory: HostFactory = Box::new(move |_: WindowId| -> Result<Box<dyn HostWindow>, Win32Error> {
            Ok(Box::new(factory_host.clone()))
        });
        let hub = Hub::new();
        let dir = std::env::temp_dir().join("edgebar-state-tests-missing");
        let state = AppState::new(config, dir, platform(), OWN_PID, factory, hub.clone());
        (state, host, hub)
    }

    fn pointer(phase: PointerPhase, x: f64, time_ms: f64) -> IpcCommand {
        IpcCommand::Pointer {
            phase,
            x,
            y: 520.0,
            time_ms,
            on_widget_control: false,
        }
    }

    fn run_ticks(state: &mut AppState<FakePlatform>, from: f64, to: f64) {
        let mut now = from;
        while now <= to {
            state.tick(now);
            now += 16.0;
        }
    }

    #[test]
    fn test_attach_applies_current_geometry() {
        let (mut state, host, _) = state_with(Config::default());
        assert_eq!(state.handle_command(IpcCommand::Attach { window_id: 7 }, 0.0), IpcResponse::Ok);

        let window = host.0.lock().unwrap();
        assert!(window.visible && window.always_on_top);
        assert_eq!(window.bounds, Some(state.engine.current_frame().window));
    }

    #[test]
    fn test_swipe_expands_and_mirrors_final_bounds() {
        let (mut state, host, _) = state_with(Config::default());
        state.handle_command(IpcCommand::Attach { window_id: 7 }, 0.0);

        state.handle_command(pointer(PointerPhase::Down, 2.0, 0.0), 0.0);
        state.handle_command(pointer(PointerPhase::Move, 40.0, 50.0), 50.0);
        let response = state.handle_command(pointer(PointerPhase::Up, 90.0, 100.0), 100.0);
        assert_eq!(
            response,
            IpcResponse::Pointer {
                outcome: PointerOutcome::Settling {
                    decision: Decision::Expand
                }
            }
        );

        run_ticks(&mut state, 100.0, 600.0);
        assert_eq!(state.engine.phase(), EnginePhase::Expanded);
        assert_eq!(host.0.lock().unwrap().bounds, Some(state.engine.current_frame().window));
    }

    #[test]
    fn test_paused_drag_never_leaves_window_narrower_than_panel() {
        let (mut state, host, _) = state_with(Config::default());
        state.handle_command(IpcCommand::Attach { window_id: 7 }, 0.0);

        state.handle_command(pointer(PointerPhase::Down, 0.0, 100.0), 100.0);
        state.handle_command(pointer(PointerPhase::Move, 100.0, 120.0), 120.0);
        // Arrives inside the throttle interval of the previous move.
        state.handle_command(pointer(PointerPhase::Move, 300.0, 125.0), 125.0);

        // The finger holds still; only animation ticks follow.
        run_ticks(&mut state, 130.0, 450.0);

        let frame = state.engine.current_frame();
        let scale = state.engine.config().scale;
        let needed = ((frame.panel.margin_left + frame.panel.width) * scale).ceil() as i32;
        let applied = host.0.lock().unwrap().bounds.unwrap();
        assert_eq!(applied, frame.window);
        assert!(applied.width >= needed, "window {} narrower than panel {}", applied.width, needed);
    }

    #[test]
    fn test_destroyed_window_aborts_animation_silently() {
        let (mut state, host, _) = state_with(Config::default());
        state.handle_command(IpcCommand::Attach { window_id: 7 }, 0.0);
        state.handle_command(IpcCommand::RequestExpand, 0.0);
        state.tick(0.0);
        state.tick(100.0);
        host.0.lock().unwrap().destroy_handle().store(true, Ordering::SeqCst);

        state.tick(116.0);
        assert!(!state.mirror.is_attached());
        assert_ne!(state.engine.phase(), EnginePhase::Animating);
        let progress = state.engine.progress();
        assert!(progress > 0.0 && progress < 1.0);
    }

    #[test]
    fn test_hover_toggles_click_through() {
        let (mut state, host, _) = state_with(Config::default());
        state.handle_command(IpcCommand::Attach { window_id: 7 }, 0.0);
        let region = state.engine.interactive_region();

        let inside = IpcCommand::Hover {
            x: region.x as f64 + 1.0,
            y: region.y as f64 + 1.0,
        };
        assert_eq!(state.handle_command(inside, 0.0), IpcResponse::Hover { interactive: true });
        assert!(!host.0.lock().unwrap().ignore_mouse);

        let outside = IpcCommand::Hover { x: 1500.0, y: 10.0 };
        assert_eq!(state.handle_command(outside, 0.0), IpcResponse::Hover { interactive: false });
        let window = host.0.lock().unwrap();
        assert!(window.ignore_mouse && window.forward_mouse);
    }

    #[test]
    fn test_cursor_sampling_lifts_forwarded_click_through() {
        let (mut state, host, _) = state_with(Config::default());
        state.handle_command(IpcCommand::Attach { window_id: 7 }, 0.0);
        state.tick(0.0);

        state.handle_command(IpcCommand::Hover { x: 1500.0, y: 10.0 }, 16.0);
        assert!(host.0.lock().unwrap().ignore_mouse);

        // Still outside: click-through stays.
        *state.discovery.platform().cursor.borrow_mut() = Some((1500.0, 10.0));
        state.tick(32.0);
        assert!(host.0.lock().unwrap().ignore_mouse);

        let region = state.engine.interactive_region();
        *state.discovery.platform().cursor.borrow_mut() = Some((region.x as f64 + 1.0, region.y as f64 + 1.0));
        state.tick(48.0);
        assert!(!host.0.lock().unwrap().ignore_mouse);
    }

    #[test]
    fn test_click_through_without_forward_ignores_cursor() {
        let (mut state, host, _) = state_with(Config::default());
        state.handle_command(IpcCommand::Attach { window_id: 7 }, 0.0);
        let command = IpcCommand::SetIgnoreMouseEvents {
            ignore: true,
            forward: false,
        };
        assert_eq!(state.handle_command(command, 0.0), IpcResponse::Ok);

        let region = state.engine.interactive_region();
        *state.discovery.platform().cursor.borrow_mut() = Some((region.x as f64 + 1.0, region.y as f64 + 1.0));
        state.tick(16.0);
        assert!(host.0.lock().unwrap().ignore_mouse);
    }

    #[test]
    fn test_preview_config_notifies_subscribers() {
        let (mut state, _, hub) = state_with(Config::default());
        let mut rx = hub.subscribe_config();

        let transforms = Transforms {
            size: Some(200.0),
            ..Default::default()
        };
        state.handle_command(IpcCommand::PreviewConfig { transforms }, 0.0);

        match rx.try_recv().unwrap() {
            IpcResponse::ConfigChanged { geometry, .. } => assert_eq!(geometry.scale, 2.0),
            other => panic!("unexpected push: {:?}", other),
        }
        assert_eq!(state.engine.config().scale, 2.0);

        // Same transforms again: nothing to announce.
        let transforms = state.config.transforms.clone();
        state.handle_command(IpcCommand::PreviewConfig { transforms }, 0.0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_subscribe_returns_current_config() {
        let (mut state, _, _) = state_with(Config::default());
        match state.handle_command(IpcCommand::Subscribe { frames: false }, 0.0) {
            IpcResponse::ConfigChanged { animation_speed, geometry, .. } => {
                assert_eq!(animation_speed, 1.0);
                assert_eq!(geometry.panel_width, 450.0);
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn test_frames_reach_frame_subscribers() {
        let (mut state, _, hub) = state_with(Config::default());
        let mut rx = hub.subscribe_frames();
        state.tick(0.0);
        assert!(matches!(rx.try_recv().unwrap(), IpcResponse::Frame { .. }));
    }

    #[test]
    fn test_display_index_out_of_range_uses_primary() {
        let mut config = Config::default();
        config.transforms.display = Some(5.0);
        let (mut state, _, _) = state_with(config);
        assert_eq!(state.engine.work_area(), Rect::new(0, 0, 1920, 1040));

        *state.discovery.platform().displays.borrow_mut() = vec![display(1, 0, false), display(2, 1920, true)];
        state.refresh_displays();
        assert_eq!(state.engine.work_area(), Rect::new(1920, 0, 1920, 1040));
    }

    #[test]
    fn test_find_windows_excludes_own_process() {
        let (mut state, _, _) = state_with(Config::default());
        let response = state.handle_command(
            IpcCommand::FindWindows {
                keywords: vec!["steam".to_string()],
            },
            0.0,
        );
        match response {
            IpcResponse::Windows { windows } => {
                assert_eq!(windows.len(), 1);
                assert_eq!(windows[0].hwnd, 1);
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn test_kill_conflicting_defaults_to_configured_list() {
        let mut config = Config::default();
        config.behavior.conflicting_software = vec!["discord".to_string()];
        let (mut state, _, _) = state_with(config);

        let response = state.handle_command(IpcCommand::KillConflicting { keywords: None }, 0.0);
        assert_eq!(response, IpcResponse::Killed { pids: vec![200] });
        assert_eq!(*state.discovery.platform().terminated.borrow(), vec![200]);
    }

    #[test]
    fn test_close_last_window_uses_history() {
        let (mut state, _, _) = state_with(Config::default());
        *state.discovery.platform().foreground.borrow_mut() = Some(window(2, "Discord", 200));
        state.poll_foreground();
        *state.discovery.platform().foreground.borrow_mut() = Some(window(9, "Edgebar Settings", 300));
        state.poll_foreground();

        match state.handle_command(IpcCommand::CloseLastWindow, 0.0) {
            IpcResponse::Closed { window: Some(w) } => assert_eq!(w.hwnd, 2),
            other => panic!("unexpected response: {:?}", other),
        }
        assert_eq!(*state.discovery.platform().closed.borrow(), vec![2]);
        assert_eq!(
            state.handle_command(IpcCommand::CloseLastWindow, 0.0),
            IpcResponse::Closed { window: None }
        );
    }

    #[test]
    fn test_reload_without_file_keeps_defaults() {
        let (mut state, _, _) = state_with(Config::default());
        assert_eq!(state.handle_command(IpcCommand::ReloadConfig, 0.0), IpcResponse::Ok);
        assert_eq!(state.config, Config::default());
    }

    #[test]
    fn test_query_state_reports_phase() {
        let (mut state, _, _) = state_with(Config::default());
        state.handle_command(IpcCommand::RequestExpand, 0.0);
        state.tick(0.0);
        match state.handle_command(IpcCommand::QueryState, 50.0) {
            IpcResponse::State { phase, attached, work_area, .. } => {
                assert_eq!(phase, EnginePhase::Animating);
                assert!(!attached);
                assert_eq!(work_area, Rect::new(0, 0, 1920, 1040));
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }
}
