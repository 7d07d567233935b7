//! The 3×3 biome × humidity texture binding table.

use std::path::PathBuf;

/// The three biomes the mask can reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BiomeId {
    Stone = 0,
    Grass = 1,
    Land = 2,
}

impl BiomeId {
    pub const ALL: [BiomeId; 3] = [BiomeId::Stone, BiomeId::Grass, BiomeId::Land];

    /// Map a mask id to a biome; out-of-range ids clamp to `Land` rather
    /// than erroring, matching the mask's clamped decode.
    pub fn from_mask_id(id: u8) -> Self {
        match id {
            0 => BiomeId::Stone,
            1 => BiomeId::Grass,
            _ => BiomeId::Land,
        }
    }

    /// Representative linear-space color, used for fallback textures and
    /// debug rendering.
    pub fn representative_linear(&self) -> [f32; 3] {
        match self {
            BiomeId::Stone => [0.22, 0.22, 0.22],
            BiomeId::Grass => [0.12, 0.35, 0.07],
            BiomeId::Land => [0.56, 0.41, 0.19],
        }
    }
}

/// The three humidity states each biome can present.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HumidityBand {
    Dry = 0,
    Neutral = 1,
    Wet = 2,
}

impl HumidityBand {
    pub const ALL: [HumidityBand; 3] = [
        HumidityBand::Dry,
        HumidityBand::Neutral,
        HumidityBand::Wet,
    ];
}

/// One slot of the binding table.
#[derive(Clone, Debug, PartialEq)]
pub struct BiomeBinding {
    /// Albedo texture for this slot; `None` or a failed load falls back
    /// to the biome's representative color.
    pub texture_path: Option<PathBuf>,
    /// World-space size one texture repeat covers, meters.
    pub tile_size_m: f32,
}

impl BiomeBinding {
    fn default_for(biome: BiomeId, band: HumidityBand) -> Self {
        let biome_name = match biome {
            BiomeId::Stone => "stone",
            BiomeId::Grass => "grass",
            BiomeId::Land => "land",
        };
        let band_name = match band {
            HumidityBand::Dry => "dry",
            HumidityBand::Neutral => "neutral",
            HumidityBand::Wet => "wet",
        };
        Self {
            texture_path: Some(PathBuf::from(format!(
                "assets/textures/{biome_name}_{band_name}.png"
            ))),
            tile_size_m: 8.0,
        }
    }
}

/// All nine texture slots, addressed as layers of one array texture.
#[derive(Clone, Debug, PartialEq)]
pub struct BiomeBindingTable {
    bindings: [[BiomeBinding; 3]; 3],
}

impl Default for BiomeBindingTable {
    fn default() -> Self {
        let bindings = BiomeId::ALL
            .map(|biome| HumidityBand::ALL.map(|band| BiomeBinding::default_for(biome, band)));
        Self { bindings }
    }
}

impl BiomeBindingTable {
    /// Array-texture layer for a (biome, band) slot.
    pub fn layer_index(biome: BiomeId, band: HumidityBand) -> u32 {
        biome as u32 * 3 + band as u32
    }

    pub fn get(&self, biome: BiomeId, band: HumidityBand) -> &BiomeBinding {
        &self.bindings[biome as usize][band as usize]
    }

    pub fn set(&mut self, biome: BiomeId, band: HumidityBand, binding: BiomeBinding) {
        self.bindings[biome as usize][band as usize] = binding;
    }

    /// Slots in layer order, for assembling the array texture.
    pub fn slots(&self) -> impl Iterator<Item = (BiomeId, HumidityBand, &BiomeBinding)> {
        BiomeId::ALL.into_iter().flat_map(move |biome| {
            HumidityBand::ALL
                .into_iter()
                .map(move |band| (biome, band, self.get(biome, band)))
        })
    }

    /// Per-band tile sizes for one biome, in band order.
    pub fn tile_sizes(&self, biome: BiomeId) -> [f32; 3] {
        HumidityBand::ALL.map(|band| self.get(biome, band).tile_size_m.max(0.01))
    }

    /// Opaque fallback color for a slot whose texture is missing.
    pub fn fallback_color(&self, biome: BiomeId) -> [f32; 4] {
        let [r, g, b] = biome.representative_linear();
        [r, g, b, 1.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_index_covers_all_nine_slots_uniquely() {
        let mut seen = [false; 9];
        for biome in BiomeId::ALL {
            for band in HumidityBand::ALL {
                let layer = BiomeBindingTable::layer_index(biome, band) as usize;
                assert!(layer < 9);
                assert!(!seen[layer], "Layer {layer} assigned twice");
                seen[layer] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_slots_iterate_in_layer_order() {
        let table = BiomeBindingTable::default();
        for (i, (biome, band, _)) in table.slots().enumerate() {
            assert_eq!(BiomeBindingTable::layer_index(biome, band), i as u32);
        }
        assert_eq!(table.slots().count(), 9);
    }

    #[test]
    fn test_out_of_range_mask_id_clamps() {
        assert_eq!(BiomeId::from_mask_id(0), BiomeId::Stone);
        assert_eq!(BiomeId::from_mask_id(2), BiomeId::Land);
        assert_eq!(BiomeId::from_mask_id(200), BiomeId::Land);
    }

    #[test]
    fn test_tile_sizes_floor_to_positive() {
        let mut table = BiomeBindingTable::default();
        table.set(
            BiomeId::Grass,
            HumidityBand::Dry,
            BiomeBinding {
                texture_path: None,
                tile_size_m: 0.0,
            },
        );
        let sizes = table.tile_sizes(BiomeId::Grass);
        assert!(sizes.iter().all(|&s| s > 0.0));
    }
}
