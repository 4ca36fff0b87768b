//! Window lookup for the PotPlayer process.
//!
//! PotPlayer registers one of a handful of window classes depending on the
//! installed edition, so the locator tries a direct lookup for each known
//! class first and only then walks the full top-level window list. Handles
//! are never cached; a fresh lookup runs on every probe cycle so a restarted
//! player is picked up and a dead one is noticed.

/// Raw top-level window handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerWindow(pub isize);

/// Window classes registered by known PotPlayer editions, in preference
/// order (64-bit full, 32-bit full, then the Mini builds).
pub const POTPLAYER_CLASSES: [&str; 4] =
  ["PotPlayer64", "PotPlayer", "PotPlayerMini64", "PotPlayerMini"];

/// Access to the desktop's top-level windows.
///
/// The production implementation wraps Win32; tests substitute a fixture.
pub trait WindowEnumerator {
  /// Direct lookup of a window by exact class name.
  fn find_by_class(&self, class: &str) -> Option<PlayerWindow>;

  /// Snapshot of all top-level windows as (handle, class name), in the
  /// order the OS enumerates them.
  fn top_level_windows(&self) -> Vec<(PlayerWindow, String)>;
}

/// Two-pass PotPlayer window lookup over a [`WindowEnumerator`].
pub struct WindowLocator<E> {
  enumerator: E,
  classes: Vec<String>,
}

impl<E: WindowEnumerator> WindowLocator<E> {
  /// Locator for the known PotPlayer window classes.
  pub fn new(enumerator: E) -> Self {
    Self::with_classes(enumerator, &POTPLAYER_CLASSES)
  }

  /// Locator for an explicit class list.
  pub fn with_classes(enumerator: E, classes: &[&str]) -> Self {
    Self {
      enumerator,
      classes: classes.iter().map(|c| c.to_string()).collect(),
    }
  }

  /// Find the player window, or `None` when no known class is present.
  ///
  /// Pass one asks for each known class directly, first hit wins. Pass two
  /// scans the enumeration snapshot for any known class, which catches
  /// editions whose class lookup misses (notably when the direct lookup
  /// races a window being created).
  pub fn locate(&self) -> Option<PlayerWindow> {
    for class in &self.classes {
      if let Some(window) = self.enumerator.find_by_class(class) {
        return Some(window);
      }
    }

    self
      .enumerator
      .top_level_windows()
      .into_iter()
      .find(|(_, class)| self.classes.iter().any(|known| known == class))
      .map(|(window, _)| window)
  }
}
