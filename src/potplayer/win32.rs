//! Win32 window enumeration and message delivery.

use std::io;

use windows::core::{HSTRING, PCWSTR};
use windows::Win32::Foundation::{
  GetLastError, SetLastError, BOOL, HWND, LPARAM, TRUE, WIN32_ERROR, WPARAM,
};
use windows::Win32::UI::WindowsAndMessaging::{
  EnumWindows, FindWindowW, GetClassNameW, IsWindow, SendMessageW,
};

use super::probe::{PlayerTransport, ProbeError};
use super::protocol::WM_USER;
use super::transport::{PlayerWindow, WindowEnumerator, WindowLocator};

/// Desktop-backed [`WindowEnumerator`].
pub struct Win32Windows;

impl WindowEnumerator for Win32Windows {
  fn find_by_class(&self, class: &str) -> Option<PlayerWindow> {
    let class = HSTRING::from(class);
    let hwnd = unsafe { FindWindowW(&class, PCWSTR::null()) }.ok()?;
    if hwnd.0.is_null() {
      return None;
    }
    Some(PlayerWindow(hwnd.0 as isize))
  }

  fn top_level_windows(&self) -> Vec<(PlayerWindow, String)> {
    unsafe extern "system" fn enum_cb(hwnd: HWND, lparam: LPARAM) -> BOOL {
      let handles = &mut *(lparam.0 as *mut Vec<isize>);
      handles.push(hwnd.0 as isize);
      TRUE
    }

    let mut handles: Vec<isize> = Vec::new();
    unsafe {
      let _ = EnumWindows(
        Some(enum_cb),
        LPARAM(&mut handles as *mut Vec<isize> as isize),
      );
    }

    handles
      .into_iter()
      .map(|raw| (PlayerWindow(raw), class_name(HWND(raw as *mut _))))
      .collect()
  }
}

/// Class name of a window, empty when the handle is gone.
fn class_name(hwnd: HWND) -> String {
  let mut buf = [0u16; 256];
  let len = unsafe { GetClassNameW(hwnd, &mut buf) };
  if len <= 0 {
    return String::new();
  }
  String::from_utf16_lossy(&buf[..len as usize])
}

/// Production [`PlayerTransport`] speaking `WM_USER` to the real window.
pub struct Win32Transport {
  locator: WindowLocator<Win32Windows>,
}

impl Win32Transport {
  pub fn new() -> Self {
    Self {
      locator: WindowLocator::new(Win32Windows),
    }
  }
}

impl Default for Win32Transport {
  fn default() -> Self {
    Self::new()
  }
}

impl PlayerTransport for Win32Transport {
  fn locate(&self) -> Result<PlayerWindow, ProbeError> {
    self.locator.locate().ok_or(ProbeError::WindowNotFound)
  }

  fn query(&self, window: PlayerWindow, request: u32) -> Result<isize, ProbeError> {
    let hwnd = HWND(window.0 as *mut _);
    unsafe {
      if !IsWindow(hwnd).as_bool() {
        return Err(ProbeError::WindowNotFound);
      }
      // SendMessageW only touches the calling thread's last error when the
      // send itself fails, so the bracket detects a window that died
      // between the IsWindow check and the send.
      SetLastError(WIN32_ERROR(0));
      let reply = SendMessageW(hwnd, WM_USER, WPARAM(request as usize), LPARAM(0));
      let err = GetLastError();
      if err.0 != 0 {
        return Err(ProbeError::Query {
          request,
          source: io::Error::from_raw_os_error(err.0 as i32),
        });
      }
      Ok(reply.0)
    }
  }
}
