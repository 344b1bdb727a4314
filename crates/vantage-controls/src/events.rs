use vantage_scene::NodeId;

#[derive(Clone, Debug, PartialEq)]
pub enum ControlsEvent {
    /// Visual state changed; redraw. Coalesced to one per flush.
    Change,
    Start,
    End,
    PropertyChanged(&'static str),
    SelectionChanged {
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
    },
    Dispose,
}

impl ControlsEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Change => "change",
            Self::Start => "start",
            Self::End => "end",
            Self::PropertyChanged(name) => name,
            Self::SelectionChanged { .. } => "selection",
            Self::Dispose => "dispose",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    events: Vec<ControlsEvent>,
    change_pending: bool,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: ControlsEvent) {
        if event == ControlsEvent::Change {
            self.change_pending = true;
        } else {
            self.events.push(event);
        }
    }

    pub fn request_change(&mut self) {
        self.change_pending = true;
    }

    pub fn property_changed(&mut self, name: &'static str) {
        self.events.push(ControlsEvent::PropertyChanged(name));
        self.change_pending = true;
    }

    pub fn is_change_pending(&self) -> bool {
        self.change_pending
    }

    pub fn flush(&mut self) {
        if self.change_pending {
            self.change_pending = false;
            self.events.push(ControlsEvent::Change);
        }
    }

    pub fn take(&mut self) -> Vec<ControlsEvent> {
        self.flush();
        std::mem::take(&mut self.events)
    }
}
