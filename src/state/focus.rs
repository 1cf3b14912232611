/// Every panel the UI can create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewName {
    Status,
    Delay,
    Headers,
    Body,
    Request,
    Info,
    Save,
    Responses,
    Bindings,
    FileDialog,
}

/// Tab order of the panels that take input.
pub const CYCLE: [ViewName; 5] = [
    ViewName::Status,
    ViewName::Delay,
    ViewName::Headers,
    ViewName::Body,
    ViewName::Request,
];

impl ViewName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewName::Status => "status",
            ViewName::Delay => "delay",
            ViewName::Headers => "headers",
            ViewName::Body => "body",
            ViewName::Request => "request",
            ViewName::Info => "info",
            ViewName::Save => "save",
            ViewName::Responses => "responses",
            ViewName::Bindings => "bindings",
            ViewName::FileDialog => "file-dialog",
        }
    }

    pub fn is_cyclic(&self) -> bool {
        CYCLE.contains(self)
    }

    /// Modal overlays drawn over the panels.
    pub fn is_popup(&self) -> bool {
        matches!(
            self,
            ViewName::Save | ViewName::Responses | ViewName::Bindings | ViewName::FileDialog
        )
    }

    /// The four panels that make up the response builder.
    pub fn is_builder(&self) -> bool {
        matches!(
            self,
            ViewName::Status | ViewName::Delay | ViewName::Headers | ViewName::Body
        )
    }
}

/// Position in `CYCLE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Focus {
    index: usize,
}

impl Focus {
    /// Cycle order: Status → Delay → Headers → Body → Request → Status
    pub fn next(&self) -> Focus {
        Focus { index: (self.index + 1) % CYCLE.len() }
    }

    pub fn prev(&self) -> Focus {
        Focus { index: (self.index + CYCLE.len() - 1) % CYCLE.len() }
    }

    pub fn on(view: ViewName) -> Option<Focus> {
        CYCLE.iter().position(|v| *v == view).map(|index| Focus { index })
    }

    pub fn view(&self) -> ViewName {
        CYCLE[self.index]
    }
}
