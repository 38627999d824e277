//! District table and the urban/non-urban region rule.
//!
//! Display names must match the training data byte for byte (diacritics
//! included). Region lookup does not normalise anything: a name that is not
//! spelled exactly like a table entry is treated as non-urban.

use std::sync::OnceLock;

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct District {
    /// Canonical ASCII identifier, stable across spellings.
    pub id: &'static str,
    /// Name as the model was trained on.
    pub name: &'static str,
    pub urban: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Urban,
    NonUrban,
}

impl Region {
    pub fn flag(self) -> u8 {
        match self {
            Region::Urban => 1,
            Region::NonUrban => 0,
        }
    }
}

const fn d(id: &'static str, name: &'static str, urban: bool) -> District {
    District { id, name, urban }
}

static DISTRICTS: [District; 29] = [
    d("cau-giay", "CẦU GIẤY", true),
    d("thanh-xuan", "THANH XUÂN", true),
    d("hai-ba-trung", "HAI BÀ TRƯNG", true),
    d("tay-ho", "TÂY HỒ", true),
    d("dong-da", "ĐỐNG ĐA", true),
    d("ha-dong", "HÀ ĐÔNG", false),
    d("thanh-tri", "HUYỆN THANH TRÌ", false),
    d("hoang-mai", "HOÀNG MAI", true),
    d("long-bien", "LONG BIÊN", false),
    d("hoan-kiem", "HOÀN KIẾM", true),
    d("nam-tu-liem", "NAM TỪ LIÊM", false),
    d("ba-dinh", "BA ĐÌNH", true),
    d("hoai-duc", "HUYỆN HOÀI ĐỨC", false),
    d("bac-tu-liem", "BẮC TỪ LIÊM", false),
    d("dan-phuong", "HUYỆN ĐAN PHƯỢNG", false),
    d("thanh-oai", "HUYỆN THANH OAI", false),
    d("soc-son", "HUYỆN SÓC SƠN", false),
    d("gia-lam", "HUYỆN GIA LÂM", false),
    d("chuong-my", "HUYỆN CHƯƠNG MỸ", false),
    d("dong-anh", "HUYỆN ĐÔNG ANH", false),
    d("thuong-tin", "HUYỆN THƯỜNG TÍN", false),
    d("son-tay", "THỊ XÃ SƠN TÂY", false),
    d("me-linh", "HUYỆN MÊ LINH", false),
    d("thach-that", "HUYỆN THẠCH THẤT", false),
    d("quoc-oai", "HUYỆN QUỐC OAI", false),
    d("phuc-tho", "HUYỆN PHÚC THỌ", false),
    d("phu-xuyen", "HUYỆN PHÚ XUYÊN", false),
    d("ba-vi", "HUYỆN BA VÌ", false),
    d("my-duc", "HUYỆN MỸ ĐỨC", false),
];

/// Read-only view over the district table.
#[derive(Debug)]
pub struct DistrictTable {
    entries: &'static [District],
}

impl DistrictTable {
    /// The process-wide table.
    pub fn global() -> &'static DistrictTable {
        static TABLE: OnceLock<DistrictTable> = OnceLock::new();
        TABLE.get_or_init(|| DistrictTable { entries: &DISTRICTS })
    }

    pub fn entries(&self) -> &[District] {
        self.entries
    }

    pub fn by_id(&self, id: &str) -> Option<&District> {
        self.entries.iter().find(|d| d.id.eq_ignore_ascii_case(id.trim()))
    }

    /// Exact, byte-wise name lookup.
    pub fn by_name(&self, name: &str) -> Option<&District> {
        self.entries.iter().find(|d| d.name == name)
    }

    /// Region for a district name. Unknown names fall back to non-urban.
    pub fn region_of(&self, name: &str) -> Region {
        match self.by_name(name) {
            Some(district) if district.urban => Region::Urban,
            Some(_) => Region::NonUrban,
            None => {
                warn!(district = name, "district not in table; region defaults to non-urban");
                Region::NonUrban
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URBAN: [&str; 8] = [
        "CẦU GIẤY",
        "THANH XUÂN",
        "HAI BÀ TRƯNG",
        "TÂY HỒ",
        "ĐỐNG ĐA",
        "HOÀNG MAI",
        "HOÀN KIẾM",
        "BA ĐÌNH",
    ];

    #[test]
    fn urban_set_maps_to_one() {
        let table = DistrictTable::global();
        for name in URBAN {
            assert_eq!(table.region_of(name).flag(), 1, "{name}");
        }
    }

    #[test]
    fn every_other_table_entry_is_non_urban() {
        let table = DistrictTable::global();
        for district in table.entries().iter().filter(|d| !URBAN.contains(&d.name)) {
            assert_eq!(table.region_of(district.name), Region::NonUrban, "{}", district.name);
        }
        assert_eq!(table.entries().len(), 29);
    }

    #[test]
    fn diacritic_mismatch_is_not_corrected() {
        let table = DistrictTable::global();
        // Â instead of Ấ.
        assert_eq!(table.region_of("CẦU GIÂY"), Region::NonUrban);
        assert_eq!(table.region_of("cầu giấy"), Region::NonUrban);
        assert_eq!(table.region_of("CAU GIAY"), Region::NonUrban);
        assert_eq!(table.region_of(" CẦU GIẤY"), Region::NonUrban);
    }

    #[test]
    fn ids_resolve_to_exact_names() {
        let table = DistrictTable::global();
        assert_eq!(table.by_id("cau-giay").map(|d| d.name), Some("CẦU GIẤY"));
        assert!(table.by_id("nowhere").is_none());
    }
}
