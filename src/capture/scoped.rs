use std::ops::{Deref, DerefMut};

use tracing::{debug, warn};

use crate::camera::CameraSession;
use crate::light::LightControl;

/// Owns a connected light and disconnects it when dropped.
pub struct ScopedLight<L: LightControl> {
    light: L,
}

impl<L: LightControl> ScopedLight<L> {
    pub fn new(light: L) -> Self {
        Self { light }
    }
}

impl<L: LightControl> Deref for ScopedLight<L> {
    type Target = L;

    fn deref(&self) -> &L {
        &self.light
    }
}

impl<L: LightControl> DerefMut for ScopedLight<L> {
    fn deref_mut(&mut self) -> &mut L {
        &mut self.light
    }
}

impl<L: LightControl> Drop for ScopedLight<L> {
    fn drop(&mut self) {
        match self.light.disconnect() {
            Ok(()) => debug!("Light released"),
            Err(e) => warn!(error = %e, "Failed to disconnect light"),
        }
    }
}

/// Owns an open camera session and closes it when dropped.
pub struct ScopedCamera<S: CameraSession> {
    session: S,
}

impl<S: CameraSession> ScopedCamera<S> {
    pub fn new(session: S) -> Self {
        Self { session }
    }
}

impl<S: CameraSession> Deref for ScopedCamera<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.session
    }
}

impl<S: CameraSession> DerefMut for ScopedCamera<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.session
    }
}

impl<S: CameraSession> Drop for ScopedCamera<S> {
    fn drop(&mut self) {
        match self.session.close() {
            Ok(()) => debug!("Camera released"),
            Err(e) => warn!(error = %e, "Failed to close camera"),
        }
    }
}
