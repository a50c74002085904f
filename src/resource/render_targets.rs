//! The three color targets of the outline passes.

use crate::context::Context;
use crate::error::SetupError;
use crate::post_processing::Pass;

/// Creation parameters of one outline target.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TargetDescriptor {
    /// Pass writing this target.
    pub pass: Pass,
    /// Width in device pixels.
    pub width: u32,
    /// Height in device pixels.
    pub height: u32,
    /// Color format, shared by all three targets.
    pub format: wgpu::TextureFormat,
    /// Texture usages.
    pub usage: wgpu::TextureUsages,
}

impl TargetDescriptor {
    fn label(&self) -> &'static str {
        match self.pass {
            Pass::FullRender => "outline_full_target",
            Pass::OutlineExtrusion => "outline_extrusion_target",
            Pass::OutlineMask => "outline_mask_target",
        }
    }

    /// The wgpu texture descriptor.
    pub fn to_wgpu(&self) -> wgpu::TextureDescriptor<'static> {
        wgpu::TextureDescriptor {
            label: Some(self.label()),
            size: wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.format,
            usage: self.usage,
            view_formats: &[],
        }
    }
}

/// One allocated outline target.
pub struct RenderTarget {
    /// The color texture.
    pub texture: wgpu::Texture,
    /// View for rendering into and sampling from the texture.
    pub view: wgpu::TextureView,
    /// How the texture was created.
    pub descriptor: TargetDescriptor,
}

/// The Full, Extrusion and Mask targets, allocated once from the drawable size.
///
/// There is no resize: a new drawable size needs a new set.
pub struct RenderTargetSet {
    full: RenderTarget,
    extrusion: RenderTarget,
    mask: RenderTarget,
    sampler: wgpu::Sampler,
}

impl RenderTargetSet {
    /// Computes the descriptors of the three targets.
    ///
    /// `allowed` is the set of usages the device guarantees for `format`. The
    /// Full target is also a copy destination, for the inline blit of the host
    /// frame, and a storage texture when the format allows it.
    pub fn descriptors(
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        allowed: wgpu::TextureUsages,
    ) -> Result<[TargetDescriptor; 3], SetupError> {
        if width == 0 || height == 0 {
            return Err(SetupError::InvalidViewport { width, height });
        }

        let sampled = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;
        if !allowed.contains(sampled | wgpu::TextureUsages::COPY_DST) {
            return Err(SetupError::UnsupportedFormat(format));
        }

        let full_usage = sampled
            | wgpu::TextureUsages::COPY_DST
            | (allowed & wgpu::TextureUsages::STORAGE_BINDING);

        Ok(Pass::SEQUENCE.map(|pass| TargetDescriptor {
            pass,
            width,
            height,
            format,
            usage: if pass == Pass::FullRender {
                full_usage
            } else {
                sampled
            },
        }))
    }

    /// Allocates the three targets.
    pub fn allocate(
        ctxt: &Context,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> Result<Self, SetupError> {
        let [full, extrusion, mask] =
            Self::descriptors(width, height, format, ctxt.allowed_usages(format))?.map(
                |descriptor| {
                    let texture = ctxt.create_texture(&descriptor.to_wgpu());
                    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
                    RenderTarget {
                        texture,
                        view,
                        descriptor,
                    }
                },
            );

        let sampler = ctxt.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("outline_target_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Ok(RenderTargetSet {
            full,
            extrusion,
            mask,
            sampler,
        })
    }

    /// The target written by `pass`.
    #[inline]
    pub fn get(&self, pass: Pass) -> &RenderTarget {
        match pass {
            Pass::FullRender => &self.full,
            Pass::OutlineExtrusion => &self.extrusion,
            Pass::OutlineMask => &self.mask,
        }
    }

    /// Sampler shared by the three targets.
    #[inline]
    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    /// Size of every target.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.full.descriptor.width, self.full.descriptor.height)
    }

    /// Color format of every target.
    #[inline]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.full.descriptor.format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8Unorm;

    fn allowed() -> wgpu::TextureUsages {
        FORMAT
            .guaranteed_format_features(wgpu::Features::empty())
            .allowed_usages
    }

    #[test]
    fn test_targets_share_size_and_format() {
        let descs = RenderTargetSet::descriptors(1024, 768, FORMAT, allowed()).unwrap();

        for d in descs.iter() {
            assert_eq!((d.width, d.height), (1024, 768));
            assert_eq!(d.format, FORMAT);
            assert!(d.usage.contains(wgpu::TextureUsages::TEXTURE_BINDING));
            assert!(d.usage.contains(wgpu::TextureUsages::RENDER_ATTACHMENT));
        }
        assert_eq!(descs.map(|d| d.pass), Pass::SEQUENCE);
    }

    #[test]
    fn test_only_full_is_writable() {
        let [full, extrusion, mask] =
            RenderTargetSet::descriptors(640, 480, FORMAT, allowed()).unwrap();

        assert!(full.usage.contains(wgpu::TextureUsages::COPY_DST));
        for d in [extrusion, mask] {
            assert!(!d.usage.contains(wgpu::TextureUsages::COPY_DST));
            assert!(!d.usage.contains(wgpu::TextureUsages::STORAGE_BINDING));
        }
    }

    #[test]
    fn test_rejects_empty_viewport() {
        let err = RenderTargetSet::descriptors(0, 768, FORMAT, allowed()).unwrap_err();
        assert_eq!(
            err,
            SetupError::InvalidViewport {
                width: 0,
                height: 768
            }
        );
    }

    #[test]
    fn test_rejects_non_renderable_format() {
        let err = RenderTargetSet::descriptors(
            16,
            16,
            FORMAT,
            wgpu::TextureUsages::TEXTURE_BINDING,
        )
        .unwrap_err();
        assert_eq!(err, SetupError::UnsupportedFormat(FORMAT));
    }
}
