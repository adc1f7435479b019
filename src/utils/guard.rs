/// Runs a callback when dropped, including during unwinding.
///
/// Used by `main` to hand the terminal back to the shell however the app
/// exits.
///
/// ```
/// use hyprchat::utils::guard::ExitGuard;
///
/// let _guard = ExitGuard::new(|| println!("restored"));
/// ```
pub struct ExitGuard<F: FnOnce()> {
    on_exit: Option<F>,
}

impl<F: FnOnce()> ExitGuard<F> {
    pub fn new(on_exit: F) -> Self {
        Self {
            on_exit: Some(on_exit),
        }
    }
}

impl<F: FnOnce()> Drop for ExitGuard<F> {
    fn drop(&mut self) {
        if let Some(f) = self.on_exit.take() {
            f()
        }
    }
}
