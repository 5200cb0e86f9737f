// SPDX-License-Identifier: GPL-3.0-only

/// Receives projection changes from the synchronizer; this is the list view's side of the contract.
pub trait ProjectionObserver: Send + Sync {
    /// A remote fetch began (show the loading indicator)
    fn loading_started(&self) {}

    /// A remote fetch ended, successfully or not
    fn loading_finished(&self) {}

    /// The whole projection was replaced
    fn projection_reloaded(&self, count: usize);

    /// The projection entry at `index` changed in place
    fn row_changed(&self, index: usize);

    /// Loading failed; `message` is meant for display
    fn load_failed(&self, message: &str);
}
