use std::fmt::Debug;
use std::io;
#[cfg(test)]
use std::sync::Arc;
use std::time::Instant;

#[cfg(test)]
use crate::pal::{FakePlatform, MockPlatform};
use crate::pal::{BUILD_TARGET_PLATFORM, BuildTargetPlatform, Platform, SavedAffinity};

#[derive(Clone)]
pub(crate) enum PlatformFacade {
    Real(&'static BuildTargetPlatform),

    #[cfg(test)]
    Fake(FakePlatform),

    #[cfg(test)]
    Mock(Arc<MockPlatform>),
}

impl PlatformFacade {
    pub(crate) fn real() -> Self {
        Self::Real(&BUILD_TARGET_PLATFORM)
    }

    #[cfg(test)]
    pub(crate) fn from_mock(mock: MockPlatform) -> Self {
        Self::Mock(Arc::new(mock))
    }
}

impl Platform for PlatformFacade {
    #[inline]
    fn ticks(&self) -> u64 {
        match self {
            Self::Real(p) => p.ticks(),
            #[cfg(test)]
            Self::Fake(p) => p.ticks(),
            #[cfg(test)]
            Self::Mock(p) => p.ticks(),
        }
    }

    fn now(&self) -> Instant {
        match self {
            Self::Real(p) => p.now(),
            #[cfg(test)]
            Self::Fake(p) => p.now(),
            #[cfg(test)]
            Self::Mock(p) => p.now(),
        }
    }

    fn pin_current_thread(&self) -> io::Result<SavedAffinity> {
        match self {
            Self::Real(p) => p.pin_current_thread(),
            #[cfg(test)]
            Self::Fake(p) => p.pin_current_thread(),
            #[cfg(test)]
            Self::Mock(p) => p.pin_current_thread(),
        }
    }

    fn restore_affinity(&self, saved: &SavedAffinity) -> io::Result<()> {
        match self {
            Self::Real(p) => p.restore_affinity(saved),
            #[cfg(test)]
            Self::Fake(p) => p.restore_affinity(saved),
            #[cfg(test)]
            Self::Mock(p) => p.restore_affinity(saved),
        }
    }
}

impl From<&'static BuildTargetPlatform> for PlatformFacade {
    fn from(p: &'static BuildTargetPlatform) -> Self {
        Self::Real(p)
    }
}

#[cfg(test)]
impl From<FakePlatform> for PlatformFacade {
    fn from(p: FakePlatform) -> Self {
        Self::Fake(p)
    }
}

#[cfg(test)]
impl From<MockPlatform> for PlatformFacade {
    fn from(p: MockPlatform) -> Self {
        Self::Mock(Arc::new(p))
    }
}

impl Debug for PlatformFacade {
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Real(p) => p.fmt(f),
            #[cfg(test)]
            Self::Fake(p) => p.fmt(f),
            #[cfg(test)]
            Self::Mock(p) => p.fmt(f),
        }
    }
}
