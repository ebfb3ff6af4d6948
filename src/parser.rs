use crate::config::SERVER_TEMPLATE;
use crate::error::{MirrorError, Result};
use crate::types::{MirrorDirectory, Region, UNKNOWN_REGION};
use regex::Regex;

/// 解析镜像目录文档
///
/// 逐行扫描, 携带当前地区:
/// 1. `## <地区>` 更新当前地区
/// 2. `[#]Server = <前缀>$repo/os/$arch` 记录 <前缀> 及当前地区
/// 3. 其他行忽略
pub fn parse(document: &str) -> Result<MirrorDirectory> {
    // "## Sweden" -> "Sweden"; a bare "##" is decoration, not a header
    let region_re = Regex::new(r"^\s*##\s*(?P<region>\S.*?)\s*$")?;
    let server_re = Regex::new(r"^\s*#?\s*Server\s*=\s*(?P<url>\S+)\s*$")?;

    let (directory, _) = document.lines().fold(
        (MirrorDirectory::default(), Region::from(UNKNOWN_REGION)),
        |(mut directory, current_region), line| {
            if let Some(caps) = server_re.captures(line) {
                let url = &caps["url"];
                let endpoint = url.strip_suffix(SERVER_TEMPLATE).unwrap_or(url);
                if !endpoint.is_empty() {
                    directory.insert(endpoint.to_string(), current_region.clone());
                }
                (directory, current_region)
            } else if let Some(caps) = region_re.captures(line) {
                (directory, caps["region"].to_string())
            } else {
                (directory, current_region)
            }
        },
    );

    if directory.is_empty() {
        return Err(MirrorError::EmptyDirectory);
    }
    Ok(directory)
}
