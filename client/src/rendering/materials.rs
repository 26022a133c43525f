use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, Face, TextureDimension, TextureFormat};
use wavefx::scene::{Material, Texture};
use wavefx::utils::hex_to_rgb;

pub fn color_from_hex(color: u32) -> Color {
    let [r, g, b] = hex_to_rgb(color);
    Color::srgb(r, g, b)
}

/// Maps a Phong specular exponent onto PBR roughness.
///
/// Uses the Blinn-Phong to Beckmann correspondence `alpha² = 2 / (n + 2)`,
/// with `perceptual_roughness = sqrt(alpha)`.
pub fn roughness_from_shininess(shininess: f32) -> f32 {
    let alpha_squared = 2.0 / (shininess.max(0.0) + 2.0);
    alpha_squared.sqrt().sqrt()
}

pub fn standard_material(material: &Material) -> StandardMaterial {
    StandardMaterial {
        base_color: color_from_hex(material.color),
        perceptual_roughness: roughness_from_shininess(material.shininess),
        metallic: 0.0,
        double_sided: material.double_sided,
        cull_mode: if material.double_sided {
            None
        } else {
            Some(Face::Back)
        },
        ..Default::default()
    }
}

/// Converts tightly packed RGBA8 texels into an image asset.
/// Returns `None` when the buffer does not match the declared size.
pub fn image_from_texture(texture: &Texture) -> Option<Image> {
    let expected = texture.width as usize * texture.height as usize * 4;
    if texture.width == 0 || texture.height == 0 || texture.data.len() != expected {
        return None;
    }
    Some(Image::new(
        Extent3d {
            width: texture.width,
            height: texture.height,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        texture.data.clone(),
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::RENDER_WORLD,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roughness_mapping() {
        assert_eq!(roughness_from_shininess(0.0), 1.0);
        let glossy = roughness_from_shininess(30.0);
        assert!((glossy - (2.0f32 / 32.0).sqrt().sqrt()).abs() < 1e-6);
        assert!(roughness_from_shininess(1000.0) < glossy);
        assert_eq!(roughness_from_shininess(-5.0), 1.0);
    }

    #[test]
    fn test_double_sided_disables_culling() {
        let material = Material {
            color: 0x021896,
            shininess: 30.0,
            flat_shading: true,
            double_sided: true,
            textures: Vec::new(),
        };
        let standard = standard_material(&material);
        assert!(standard.double_sided);
        assert_eq!(standard.cull_mode, None);

        let single = standard_material(&Material {
            double_sided: false,
            ..material
        });
        assert_eq!(single.cull_mode, Some(Face::Back));
    }

    #[test]
    fn test_image_from_texture_checks_size() {
        let texture = Texture {
            width: 2,
            height: 2,
            data: vec![255; 16],
        };
        let image = image_from_texture(&texture).unwrap();
        assert_eq!(image.width(), 2);

        let short = Texture {
            data: vec![255; 15],
            ..texture
        };
        assert!(image_from_texture(&short).is_none());
    }

    #[test]
    fn test_color_from_hex() {
        let color = color_from_hex(0xff0000).to_srgba();
        assert_eq!((color.red, color.green, color.blue), (1.0, 0.0, 0.0));
    }
}
