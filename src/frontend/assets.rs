use std::path::PathBuf;

pub const DEFAULT_BINARY_NAME: &str = "a.fb";
pub const BINARY_EXT: &str = "fb";
pub const SOURCE_EXT: &str = "fa";
pub const EXPECTED_OUTPUT_EXT: &str = "out";

pub fn default_binary_path() -> PathBuf {
    PathBuf::from(DEFAULT_BINARY_NAME)
}

pub fn default_rom_path() -> PathBuf {
    ["hardware", "rom"].iter().collect()
}

pub fn default_disk_path() -> PathBuf {
    ["hardware", "disk"].iter().collect()
}

pub fn default_suite_dir() -> PathBuf {
    ["asm", "test"].iter().collect()
}
