/// Opens a URL outside the process, fire-and-forget.
///
/// A failure here only means the user has to open the URL by hand; the
/// login keeps waiting for the redirect either way.
pub trait BrowserLauncher: Send + Sync {
    fn open_external(&self, url: &str) -> std::io::Result<()>;
}

/// Hands URLs to the desktop's default browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl BrowserLauncher for SystemBrowser {
    fn open_external(&self, url: &str) -> std::io::Result<()> {
        webbrowser::open(url)
    }
}
