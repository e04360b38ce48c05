/// Which outlet of a device, if any, the user last clicked.
///
/// There is no transition back to [`OutletSelection::None`]: the selection
/// is sticky until another outlet is clicked. Whether the device itself is the
/// active selection is decided by the container, not here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutletSelection {
    #[default]
    None,
    Outlet(String),
}

/// Tracks outlet selection for one device view.
///
/// `SelectionState` is responsible for:
/// - Remembering the last clicked outlet key
/// - Deciding whether an outlet is drawn highlighted
///
/// # Highlight Model
///
/// An outlet is highlighted only when its key matches the selected key **and**
/// the container reports that a nested component holds focus. This keeps a
/// stale outlet selection from lighting up after the user selects the device
/// body instead.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    current: OutletSelection,
}

impl SelectionState {
    /// Creates a new `SelectionState` with no selection.
    ///
    /// # Examples
    ///
    /// ```
    /// use upsview_canvas::selection::SelectionState;
    ///
    /// let state = SelectionState::new();
    /// assert_eq!(state.selected_key(), None);
    /// ```
    pub fn new() -> Self {
        Self {
            current: OutletSelection::None,
        }
    }

    /// Returns the current selection state.
    pub fn current(&self) -> &OutletSelection {
        &self.current
    }

    /// Returns the key of the selected outlet.
    ///
    /// # Returns
    ///
    /// `Some(key)` if an outlet has been clicked, `None` otherwise.
    pub fn selected_key(&self) -> Option<&str> {
        match &self.current {
            OutletSelection::Outlet(key) => Some(key),
            OutletSelection::None => None,
        }
    }

    /// Marks `key` as the selected outlet.
    ///
    /// # Returns
    ///
    /// `true` if the selection moved to a different outlet.
    pub fn select_outlet(&mut self, key: &str) -> bool {
        if self.selected_key() == Some(key) {
            return false;
        }
        self.current = OutletSelection::Outlet(key.to_string());
        true
    }

    /// Returns whether the outlet `key` should be drawn highlighted.
    ///
    /// # Arguments
    ///
    /// * `key` - The outlet being drawn
    /// * `nested_component_selected` - Whether the container's focus is on an
    ///   outlet rather than a device
    pub fn is_highlighted(&self, key: &str, nested_component_selected: bool) -> bool {
        nested_component_selected && self.selected_key() == Some(key)
    }
}
