//! Anchor resolution: finding the screen the Value Wall is presented from.

/// Upper bound on descent steps; a host tree deeper than this is treated as
/// cyclic and the walk stops at the deepest node reached.
pub const MAX_ANCHOR_DEPTH: usize = 64;

/// Capability that yields the current topmost presentable screen.
pub trait AnchorResolver {
    type Anchor;

    fn resolve_anchor(&self) -> Option<Self::Anchor>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Plain,
    NavigationStack,
    TabSet,
}

impl ContainerKind {
    /// plain=0 navigation=1 tabs=2; unknown values map to plain.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::NavigationStack,
            2 => Self::TabSet,
            _ => Self::Plain,
        }
    }
}

/// A node in the host's screen hierarchy.
///
/// `focused_child` is the visible screen of a navigation stack or the
/// selected screen of a tab set. It is only consulted for those kinds.
pub trait ScreenContainer: Sized {
    fn kind(&self) -> ContainerKind;
    fn presented(&self) -> Option<Self>;
    fn focused_child(&self) -> Option<Self>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descent<C> {
    PresentedModal(C),
    NavigationTop(C),
    TabSelection(C),
    Stop,
}

/// One traversal step: a presented modal wins over container children.
pub fn descend<C: ScreenContainer>(node: &C) -> Descent<C> {
    if let Some(presented) = node.presented() {
        return Descent::PresentedModal(presented);
    }
    match node.kind() {
        ContainerKind::NavigationStack => node
            .focused_child()
            .map_or(Descent::Stop, Descent::NavigationTop),
        ContainerKind::TabSet => node
            .focused_child()
            .map_or(Descent::Stop, Descent::TabSelection),
        ContainerKind::Plain => Descent::Stop,
    }
}

/// Walks from `root` to the topmost presentable screen.
pub fn topmost_screen<C: ScreenContainer>(root: C) -> C {
    let mut current = root;
    for _ in 0..MAX_ANCHOR_DEPTH {
        current = match descend(&current) {
            Descent::PresentedModal(next)
            | Descent::NavigationTop(next)
            | Descent::TabSelection(next) => next,
            Descent::Stop => return current,
        };
    }
    tracing::warn!(
        max_depth = MAX_ANCHOR_DEPTH,
        "anchor traversal hit depth limit; presenting from deepest screen reached"
    );
    current
}

/// Resolves the anchor by asking the host for its root screen and walking
/// to the topmost one.
pub struct TopmostScreenResolver<F> {
    root: F,
}

impl<F> TopmostScreenResolver<F> {
    pub fn new(root: F) -> Self {
        Self { root }
    }
}

impl<F, C> AnchorResolver for TopmostScreenResolver<F>
where
    F: Fn() -> Option<C>,
    C: ScreenContainer,
{
    type Anchor = C;

    fn resolve_anchor(&self) -> Option<C> {
        (self.root)().map(topmost_screen)
    }
}
