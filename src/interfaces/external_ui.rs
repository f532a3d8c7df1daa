use crate::error::{OnlineError, OnlineResult};
use crate::sdk::{OverlayApi, OverlayDialog, SteamSdk};
use regex::Regex;
use std::sync::Arc;

const OVERLAY_FACET: &str = "ISteamFriends (overlay)";

/// Opens the platform overlay on top of the game
pub struct ExternalUi {
    sdk: Arc<dyn SteamSdk>,
    url_pattern: Regex,
}

impl ExternalUi {
    pub fn new(sdk: Arc<dyn SteamSdk>) -> Self {
        Self {
            sdk,
            url_pattern: Regex::new(r"^https?://\S+").expect("Invalid overlay URL regex"),
        }
    }

    fn overlay(&self, context: &str) -> OnlineResult<&dyn OverlayApi> {
        self.sdk.overlay().ok_or_else(|| {
            tracing::warn!("{}: Can't get {}", context, OVERLAY_FACET);
            OnlineError::SdkUnavailable(OVERLAY_FACET)
        })
    }

    fn show(&self, dialog: OverlayDialog) -> OnlineResult<()> {
        tracing::debug!("Opening overlay dialog '{}'", dialog.as_str());
        self.overlay("ActivateGameOverlay")?
            .activate_game_overlay(dialog);
        Ok(())
    }

    pub fn show_achievements_ui(&self) -> OnlineResult<()> {
        self.show(OverlayDialog::Achievements)
    }

    pub fn show_friends_ui(&self) -> OnlineResult<()> {
        self.show(OverlayDialog::Friends)
    }

    pub fn show_stats_ui(&self) -> OnlineResult<()> {
        self.show(OverlayDialog::Stats)
    }

    /// Open `url` in the overlay browser (http and https only)
    pub fn show_web_url(&self, url: &str) -> OnlineResult<()> {
        if !self.url_pattern.is_match(url) {
            tracing::warn!("ShowWebUrl: rejected URL '{}'", url);
            return Err(OnlineError::InvalidUrl(url.to_string()));
        }
        self.overlay("ActivateGameOverlayToWebPage")?
            .activate_game_overlay_to_web_page(url);
        Ok(())
    }

    /// False when the user disabled the overlay or it failed to inject
    pub fn is_overlay_enabled(&self) -> bool {
        self.sdk
            .overlay()
            .is_some_and(|overlay| overlay.is_overlay_enabled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppId, SteamId};
    use crate::sdk::MockOverlayApi;
    use crate::sdk::SimulatedSteam;
    use crate::sdk::test_support::MockedSdk;

    #[test]
    fn test_dialogs_reach_overlay() {
        let sim = Arc::new(SimulatedSteam::new(AppId(480), SteamId(1)));
        assert!(sim.init());
        let ui = ExternalUi::new(sim.clone());

        ui.show_achievements_ui().unwrap();
        ui.show_friends_ui().unwrap();
        ui.show_stats_ui().unwrap();
        ui.show_web_url("https://store.steampowered.com/app/480")
            .unwrap();

        assert_eq!(
            sim.overlay_history(),
            vec![
                "achievements",
                "friends",
                "stats",
                "https://store.steampowered.com/app/480"
            ]
        );
    }

    #[test]
    fn test_bad_urls_never_reach_overlay() {
        let mut overlay = MockOverlayApi::new();
        overlay.expect_activate_game_overlay_to_web_page().never();
        let ui = ExternalUi::new(Arc::new(MockedSdk {
            overlay: Some(overlay),
            ..Default::default()
        }));

        for url in ["", "store.steampowered.com", "ftp://example.com", "https://"] {
            assert_eq!(
                ui.show_web_url(url),
                Err(OnlineError::InvalidUrl(url.to_string()))
            );
        }
    }

    #[test]
    fn test_overlay_unavailable() {
        let ui = ExternalUi::new(Arc::new(MockedSdk::default()));
        assert_eq!(
            ui.show_friends_ui(),
            Err(OnlineError::SdkUnavailable(OVERLAY_FACET))
        );
        assert!(!ui.is_overlay_enabled());
    }

    #[test]
    fn test_overlay_enabled_flag() {
        let mut overlay = MockOverlayApi::new();
        overlay.expect_is_overlay_enabled().return_const(true);
        let ui = ExternalUi::new(Arc::new(MockedSdk {
            overlay: Some(overlay),
            ..Default::default()
        }));
        assert!(ui.is_overlay_enabled());
    }
}
