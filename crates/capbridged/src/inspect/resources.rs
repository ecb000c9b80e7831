//! Buffer and texture contents.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

use super::errors::InspectError;
use crate::provider::{
    BufferDesc, CaptureProvider, ProviderError, ResourceId, Subresource, TextureDesc,
};

/// Result of `get_buffer_contents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BufferContents {
    /// Buffer id.
    pub resource_id: ResourceId,
    /// First byte returned.
    pub offset: u64,
    /// Number of bytes returned.
    pub length: u64,
    /// Size of the whole buffer.
    pub total_size: u64,
    /// Returned bytes, base64 encoded.
    pub content_base64: String,
}

/// Result of `get_texture_data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextureData {
    /// Texture id.
    pub resource_id: ResourceId,
    /// Mip level read.
    pub mip: u32,
    /// Array slice read.
    pub slice: u32,
    /// Sample read.
    pub sample: u32,
    /// Width at this mip.
    pub width: u32,
    /// Height at this mip.
    pub height: u32,
    /// Depth at this mip.
    pub depth: u32,
    /// Pixel format.
    pub format: String,
    /// Number of bytes returned.
    pub data_length: usize,
    /// Returned bytes, base64 encoded.
    pub content_base64: String,
    /// Volume slice returned, for 3D textures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth_slice: Option<u32>,
}

fn find_buffer(
    provider: &dyn CaptureProvider,
    resource_id: ResourceId,
) -> Result<BufferDesc, ProviderError> {
    provider
        .buffers()?
        .into_iter()
        .find(|buffer| buffer.resource_id == resource_id)
        .ok_or(ProviderError::ResourceNotFound { resource_id })
}

/// Metadata of a texture.
///
/// # Errors
///
/// Returns [`ProviderError::ResourceNotFound`] for unknown textures.
pub fn texture_info(
    provider: &dyn CaptureProvider,
    resource_id: ResourceId,
) -> Result<TextureDesc, ProviderError> {
    provider
        .textures()?
        .into_iter()
        .find(|texture| texture.resource_id == resource_id)
        .ok_or(ProviderError::ResourceNotFound { resource_id })
}

/// Reads a window of a buffer. A `length` of zero reads to the end.
///
/// # Errors
///
/// Returns [`InspectError::InvalidArgument`] when `offset` lies past the end
/// of the buffer.
pub fn buffer_contents(
    provider: &mut dyn CaptureProvider,
    resource_id: ResourceId,
    offset: u64,
    length: u64,
) -> Result<BufferContents, InspectError> {
    let buffer = find_buffer(provider, resource_id)?;
    let total_size = buffer.length;
    let Some(available) = total_size.checked_sub(offset) else {
        return Err(InspectError::invalid(format!(
            "Offset {offset} is beyond buffer size {total_size}"
        )));
    };
    let window = if length == 0 {
        available
    } else {
        length.min(available)
    };
    let bytes = provider.buffer_data(resource_id, offset, window)?;
    Ok(BufferContents {
        resource_id,
        offset,
        length: bytes.len() as u64,
        total_size,
        content_base64: STANDARD.encode(&bytes),
    })
}

fn mip_extent(extent: u32, mip: u32) -> u32 {
    extent.checked_shr(mip).unwrap_or(0).max(1)
}

fn check_range(name: &str, value: u32, count: u32) -> Result<(), InspectError> {
    if value < count {
        Ok(())
    } else {
        Err(InspectError::invalid(format!(
            "{name} {value} out of range (texture has {count})"
        )))
    }
}

/// Reads one subresource of a texture, optionally a single slice of a
/// volume texture.
///
/// # Errors
///
/// Returns [`InspectError::InvalidArgument`] when the mip, slice, sample or
/// depth slice is out of range, or when a depth slice is requested from a
/// texture that is not 3D.
pub fn texture_data(
    provider: &mut dyn CaptureProvider,
    resource_id: ResourceId,
    subresource: Subresource,
    depth_slice: Option<u32>,
) -> Result<TextureData, InspectError> {
    let texture = texture_info(provider, resource_id)?;
    check_range("Mip level", subresource.mip, texture.mip_levels)?;
    check_range("Array slice", subresource.slice, texture.array_size)?;
    check_range("Sample", subresource.sample, texture.msaa_samples)?;

    let width = mip_extent(texture.width, subresource.mip);
    let height = mip_extent(texture.height, subresource.mip);
    let depth = mip_extent(texture.depth, subresource.mip);

    let mut bytes = provider.texture_data(resource_id, subresource)?;
    if let Some(index) = depth_slice {
        if !texture.is_3d() {
            return Err(InspectError::invalid(
                "depth_slice is only valid for 3D textures",
            ));
        }
        check_range("Depth slice", index, depth)?;
        let slice_len = bytes.len().checked_div(depth as usize).unwrap_or(0);
        let start = (index as usize).saturating_mul(slice_len);
        bytes = bytes
            .get(start..start.saturating_add(slice_len))
            .map(<[u8]>::to_vec)
            .unwrap_or_default();
    }

    Ok(TextureData {
        resource_id,
        mip: subresource.mip,
        slice: subresource.slice,
        sample: subresource.sample,
        width,
        height,
        depth,
        format: texture.format,
        data_length: bytes.len(),
        content_base64: STANDARD.encode(&bytes),
        depth_slice,
    })
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;
    use crate::provider::SnapshotProvider;
    use crate::provider::snapshot::test_support::fixture_provider;

    #[fixture]
    fn provider() -> SnapshotProvider {
        fixture_provider()
    }

    fn decoded(content: &str) -> Vec<u8> {
        STANDARD.decode(content).expect("base64")
    }

    #[rstest]
    #[case::whole(0, 0, 16)]
    #[case::window(4, 8, 8)]
    #[case::to_end(10, 0, 6)]
    #[case::clamped(12, 64, 4)]
    #[case::at_end(16, 0, 0)]
    fn buffer_windows(
        mut provider: SnapshotProvider,
        #[case] offset: u64,
        #[case] length: u64,
        #[case] expected: u64,
    ) {
        let contents =
            buffer_contents(&mut provider, ResourceId::new(500), offset, length).expect("read");
        assert_eq!(contents.length, expected);
        assert_eq!(contents.total_size, 16);
        let bytes = decoded(&contents.content_base64);
        assert_eq!(bytes.first().copied(), (expected > 0).then(|| offset as u8));
    }

    #[rstest]
    fn offsets_past_the_end_are_invalid(mut provider: SnapshotProvider) {
        let error = buffer_contents(&mut provider, ResourceId::new(500), 17, 0)
            .expect_err("past end");
        assert!(matches!(error, InspectError::InvalidArgument { .. }));
        assert_eq!(error.to_string(), "Offset 17 is beyond buffer size 16");
    }

    #[rstest]
    fn unknown_buffers_are_provider_errors(mut provider: SnapshotProvider) {
        let error =
            buffer_contents(&mut provider, ResourceId::new(42), 0, 0).expect_err("unknown");
        assert_eq!(error.to_string(), "Resource ResourceId::42 not found");
    }

    #[rstest]
    fn mip_extents_shrink_to_one(mut provider: SnapshotProvider) {
        let data = texture_data(
            &mut provider,
            ResourceId::new(200),
            Subresource {
                mip: 1,
                ..Subresource::default()
            },
            None,
        )
        .expect("mip 1");
        assert_eq!((data.width, data.height, data.depth), (2, 2, 1));
        assert_eq!(data.data_length, 16);
        assert_eq!(data.format, "R8G8B8A8_UNORM");
    }

    #[rstest]
    #[case::mip(Subresource { mip: 2, slice: 0, sample: 0 }, "Mip level 2 out of range (texture has 2)")]
    #[case::slice(Subresource { mip: 0, slice: 1, sample: 0 }, "Array slice 1 out of range (texture has 1)")]
    #[case::sample(Subresource { mip: 0, slice: 0, sample: 4 }, "Sample 4 out of range (texture has 1)")]
    fn subresources_are_range_checked(
        mut provider: SnapshotProvider,
        #[case] subresource: Subresource,
        #[case] message: &str,
    ) {
        let error = texture_data(&mut provider, ResourceId::new(200), subresource, None)
            .expect_err("out of range");
        assert_eq!(error.to_string(), message);
    }

    #[rstest]
    fn depth_slices_return_one_plane(mut provider: SnapshotProvider) {
        let data = texture_data(
            &mut provider,
            ResourceId::new(400),
            Subresource::default(),
            Some(2),
        )
        .expect("slice 2");
        assert_eq!(data.data_length, 4);
        assert_eq!(decoded(&data.content_base64), [8, 9, 10, 11]);
        assert_eq!(data.depth_slice, Some(2));
    }

    #[rstest]
    #[case::not_volume(200, 0, "depth_slice is only valid for 3D textures")]
    #[case::too_deep(400, 4, "Depth slice 4 out of range (texture has 4)")]
    fn depth_slices_are_validated(
        mut provider: SnapshotProvider,
        #[case] raw: u64,
        #[case] index: u32,
        #[case] message: &str,
    ) {
        let error = texture_data(
            &mut provider,
            ResourceId::new(raw),
            Subresource::default(),
            Some(index),
        )
        .expect_err("invalid depth slice");
        assert_eq!(error.to_string(), message);
    }

    #[rstest]
    fn texture_info_reports_metadata(provider: SnapshotProvider) {
        let info = texture_info(&provider, ResourceId::new(400)).expect("info");
        assert_eq!(info.name, "Volume Noise");
        assert!(info.is_3d());
        assert_eq!(info.depth, 4);
    }
}
