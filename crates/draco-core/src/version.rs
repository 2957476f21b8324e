// Draco point cloud bitstream version.

/// Latest major version of the Draco Point Cloud bitstream.
pub const DRACO_POINT_CLOUD_BITSTREAM_VERSION_MAJOR: u8 = 2;

/// Latest minor version of the Draco Point Cloud bitstream.
pub const DRACO_POINT_CLOUD_BITSTREAM_VERSION_MINOR: u8 = 3;

pub const DEFAULT_POINT_CLOUD_VERSION: (u8, u8) = (
    DRACO_POINT_CLOUD_BITSTREAM_VERSION_MAJOR,
    DRACO_POINT_CLOUD_BITSTREAM_VERSION_MINOR,
);

/// Checks if the given version is at least the target version.
#[inline]
pub fn version_at_least(major: u8, minor: u8, target: (u8, u8)) -> bool {
    major > target.0 || (major == target.0 && minor >= target.1)
}

/// Only the latest point cloud version can be decoded.
#[inline]
pub fn is_supported_version(major: u8, minor: u8) -> bool {
    (major, minor) == DEFAULT_POINT_CLOUD_VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_checks() {
        assert!(version_at_least(2, 3, (2, 3)));
        assert!(version_at_least(3, 0, (2, 3)));
        assert!(!version_at_least(2, 2, (2, 3)));
        assert!(is_supported_version(2, 3));
        assert!(!is_supported_version(2, 2));
        assert!(!is_supported_version(1, 3));
    }
}
