//! Floating assistant panel state.
//!
//! The panel is either shown normally, minimized or maximized, and
//! independently either idle or being dragged by its header. Offsets
//! survive across drags so the panel stays where it was dropped.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Mode {
    #[default]
    Normal,
    Minimized,
    Maximized,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub enum Drag {
    #[default]
    Idle,
    /// Pointer position minus the panel offset when the drag began.
    Dragging { anchor_x: f64, anchor_y: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Tab {
    #[default]
    Music,
    Wallet,
    Nft,
    Notifications,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Panel {
    mode: Mode,
    drag: Drag,
    offset: (f64, f64),
    tab: Tab,
}

impl Panel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn drag(&self) -> Drag {
        self.drag
    }

    pub fn offset(&self) -> (f64, f64) {
        self.offset
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, Drag::Dragging { .. })
    }

    /// Minimize, or restore if already minimized. Returns the new mode.
    pub fn toggle_minimize(&mut self) -> Mode {
        self.mode = match self.mode {
            Mode::Minimized => Mode::Normal,
            _ => Mode::Minimized,
        };
        if self.mode == Mode::Minimized {
            self.drag = Drag::Idle;
        }
        self.mode
    }

    /// Maximize, or restore if already maximized. Returns the new mode.
    pub fn toggle_maximize(&mut self) -> Mode {
        self.mode = match self.mode {
            Mode::Maximized => Mode::Normal,
            _ => Mode::Maximized,
        };
        if self.mode == Mode::Maximized {
            self.drag = Drag::Idle;
        }
        self.mode
    }

    /// Offset to place the panel at, or `None` while maximized, where the
    /// panel fills its container and the stored offset does not apply.
    pub fn translation(&self) -> Option<(f64, f64)> {
        (self.mode != Mode::Maximized).then_some(self.offset)
    }

    /// Begin dragging from pointer `(x, y)`. Ignored unless the panel is
    /// shown normally.
    pub fn drag_start(&mut self, x: f64, y: f64) -> bool {
        if self.mode != Mode::Normal {
            return false;
        }
        self.drag = Drag::Dragging {
            anchor_x: x - self.offset.0,
            anchor_y: y - self.offset.1,
        };
        true
    }

    /// Follow the pointer. Returns the new offset while dragging.
    pub fn drag_move(&mut self, x: f64, y: f64) -> Option<(f64, f64)> {
        match self.drag {
            Drag::Dragging { anchor_x, anchor_y } => {
                self.offset = (x - anchor_x, y - anchor_y);
                Some(self.offset)
            }
            Drag::Idle => None,
        }
    }

    pub fn drag_end(&mut self) {
        self.drag = Drag::Idle;
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }
}
