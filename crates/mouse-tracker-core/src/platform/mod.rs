//! Host implementations of [`PrecisionPlatform`](crate::PrecisionPlatform).

#[cfg(not(target_os = "windows"))]
mod portable;
#[cfg(target_os = "windows")]
mod win32;

#[cfg(not(target_os = "windows"))]
pub use portable::{PortablePlatform as SystemPlatform, SleepTimer as SystemTimer};
#[cfg(target_os = "windows")]
pub use win32::{WaitableTimer as SystemTimer, WindowsPlatform as SystemPlatform};
