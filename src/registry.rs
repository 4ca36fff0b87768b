//! Protocol handler registration.
//!
//! Writes the `HKEY_CLASSES_ROOT\jellypot` keys that make Windows launch the
//! bridge for `jellypot://` links. Registration points at the executable that
//! ran the command, so re-running `register` after moving the binary updates
//! the handler.

use crate::cli::PROTOCOL_SCHEME;
use std::path::Path;
use thiserror::Error;
use windows::core::{HSTRING, PCWSTR};
use windows::Win32::System::Registry::{
  RegCloseKey, RegCreateKeyW, RegDeleteTreeW, RegSetValueExW, HKEY, HKEY_CLASSES_ROOT, REG_SZ,
};

#[derive(Debug, Error)]
pub enum RegistryError {
  #[error("could not resolve the bridge executable: {0}")]
  Exe(#[from] std::io::Error),
  #[error("registry update failed: {0}")]
  Registry(#[from] windows::core::Error),
}

/// Register `jellypot://` links to launch the current executable.
pub fn register_protocol() -> Result<(), RegistryError> {
  let exe = std::env::current_exe()?;

  let root = KeyHandle::create(PROTOCOL_SCHEME)?;
  root.set_string(None, &format!("URL:{} protocol", PROTOCOL_SCHEME))?;
  root.set_string(Some("URL Protocol"), "")?;

  let command = KeyHandle::create(&format!("{}\\shell\\open\\command", PROTOCOL_SCHEME))?;
  command.set_string(None, &launch_command(&exe))?;

  log::info!(
    "registered {}:// to launch {}",
    PROTOCOL_SCHEME,
    exe.display()
  );
  Ok(())
}

/// Remove the `jellypot://` handler registration.
pub fn unregister_protocol() -> Result<(), RegistryError> {
  unsafe { RegDeleteTreeW(HKEY_CLASSES_ROOT, &HSTRING::from(PROTOCOL_SCHEME)) }.ok()?;
  log::info!("removed the {}:// handler registration", PROTOCOL_SCHEME);
  Ok(())
}

/// Shell command line the handler key stores; `%1` receives the link.
fn launch_command(exe: &Path) -> String {
  format!("\"{}\" \"%1\"", exe.display())
}

/// A created registry key under `HKEY_CLASSES_ROOT`, closed on drop.
struct KeyHandle(HKEY);

impl KeyHandle {
  fn create(path: &str) -> Result<Self, RegistryError> {
    let mut key = HKEY::default();
    unsafe { RegCreateKeyW(HKEY_CLASSES_ROOT, &HSTRING::from(path), &mut key) }.ok()?;
    Ok(Self(key))
  }

  /// Set a `REG_SZ` value; `None` names the key's default value.
  fn set_string(&self, name: Option<&str>, value: &str) -> Result<(), RegistryError> {
    let data = reg_sz_bytes(value);
    let status = match name {
      Some(name) => unsafe {
        RegSetValueExW(self.0, &HSTRING::from(name), 0, REG_SZ, Some(&data))
      },
      None => unsafe { RegSetValueExW(self.0, PCWSTR::null(), 0, REG_SZ, Some(&data)) },
    };
    status.ok()?;
    Ok(())
  }
}

impl Drop for KeyHandle {
  fn drop(&mut self) {
    unsafe {
      let _ = RegCloseKey(self.0);
    }
  }
}

/// UTF-16 bytes with the terminating null `REG_SZ` expects.
fn reg_sz_bytes(value: &str) -> Vec<u8> {
  value
    .encode_utf16()
    .chain(std::iter::once(0))
    .flat_map(u16::to_le_bytes)
    .collect()
}
