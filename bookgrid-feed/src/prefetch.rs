/// Edge-triggered prefetch signal for an end-of-list sentinel.
///
/// The sentinel sits just after the last row. The trigger watches how close
/// the sentinel is to the viewport and fires once per proximity crossing, with
/// a lead margin so the next page is requested *before* the user actually
/// reaches the end. Repeated observations while the sentinel stays in range do
/// not re-fire; the trigger re-arms when the sentinel leaves range, or when a
/// fetch settles while the sentinel is still in range (so a tall viewport
/// keeps filling until the cursor runs out of pages).
#[derive(Clone, Copy, Debug)]
pub struct PrefetchTrigger {
    lead_margin: u64,
    in_range: bool,
    armed: bool,
}

/// How far ahead of the viewport edge the sentinel counts as "in range".
pub const DEFAULT_LEAD_MARGIN: u64 = 600;

impl PrefetchTrigger {
    pub fn new(lead_margin: u64) -> Self {
        Self {
            lead_margin,
            in_range: false,
            armed: true,
        }
    }

    pub fn lead_margin(&self) -> u64 {
        self.lead_margin
    }

    /// Re-arms for a fresh session (new query: old proximity state is
    /// meaningless once the grid is emptied).
    pub fn reset(&mut self) {
        self.in_range = false;
        self.armed = true;
    }

    /// Feeds the trigger one observation of sentinel/viewport geometry.
    ///
    /// Returns `true` when the caller should advance the cursor. `blocked`
    /// suppresses firing without disarming (a fetch in flight, an exhausted or
    /// errored cursor); the crossing is then consumed by `settled` instead.
    pub fn observe(
        &mut self,
        sentinel_start: u64,
        scroll_offset: u64,
        viewport_size: u32,
        blocked: bool,
    ) -> bool {
        let viewport_end = scroll_offset.saturating_add(viewport_size as u64);
        let in_range = sentinel_start <= viewport_end.saturating_add(self.lead_margin);

        self.in_range = in_range;
        if !in_range {
            self.armed = true;
            return false;
        }
        if !self.armed || blocked {
            return false;
        }
        self.armed = false;
        true
    }

    /// Tells the trigger a fetch settled (applied or failed). While the
    /// sentinel is still in range this re-arms, so the next observation may
    /// fire again and continue filling the viewport.
    pub fn settled(&mut self) {
        if self.in_range {
            self.armed = true;
        }
    }
}

impl Default for PrefetchTrigger {
    fn default() -> Self {
        Self::new(DEFAULT_LEAD_MARGIN)
    }
}
