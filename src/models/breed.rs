//! 品种目录
//!
//! 本地参考用的 50 个牛/水牛品种。推理服务的类别来自训练集目录名，
//! 以服务端 `GET /` 返回的列表为准；本目录只用于启动时比对和离线兜底。

use phf::phf_set;

/// 品种总数
pub const BREED_COUNT: usize = 50;

static BREEDS: phf::Set<&'static str> = phf_set! {
    "Alambadi",
    "Amritmahal",
    "Ayrshire",
    "Bachaur",
    "Banni",
    "Bargur",
    "Bhadawari",
    "Binjharpuri",
    "Brown_Swiss",
    "Dangi",
    "Deoni",
    "Gaolao",
    "Ghumusari",
    "Gir",
    "Guernsey",
    "Hallikar",
    "Hariana",
    "Holstein_Friesian",
    "Jaffrabadi",
    "Jersey",
    "Kangayam",
    "Kankrej",
    "Kasargod",
    "Kenkatha",
    "Kherigarh",
    "Khillari",
    "Kosali",
    "Krishna_Valley",
    "Malnad_gidda",
    "Mehsana",
    "Motu",
    "Murrah",
    "Nagori",
    "Nagpuri",
    "Nili_Ravi",
    "Nimari",
    "Ongole",
    "Ponwar",
    "Pulikulam",
    "Punganur",
    "Rathi",
    "Red_Dane",
    "Red_Sindhi",
    "Sahiwal",
    "Siri",
    "Surti",
    "Tharparkar",
    "Toda",
    "Umblachery",
    "Vechur",
};

/// 判断标签是否属于品种目录（精确匹配）
pub fn is_known_breed(label: &str) -> bool {
    BREEDS.contains(label)
}

/// 按字母序列出所有品种
pub fn all_breeds() -> Vec<&'static str> {
    let mut breeds: Vec<&'static str> = BREEDS.iter().copied().collect();
    breeds.sort_unstable();
    breeds
}

/// 服务端类别列表与本地目录的差异
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogueDiff {
    /// 本地目录中有、服务端没有的品种
    pub missing: Vec<&'static str>,
    /// 服务端有、本地目录中没有的类别
    pub unexpected: Vec<String>,
}

impl CatalogueDiff {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty()
    }
}

/// 比对服务端类别列表与本地目录
pub fn compare_with_catalogue(server_labels: &[String]) -> CatalogueDiff {
    let missing = all_breeds()
        .into_iter()
        .filter(|breed| !server_labels.iter().any(|label| label.as_str() == *breed))
        .collect();
    let unexpected = server_labels
        .iter()
        .filter(|label| !is_known_breed(label.as_str()))
        .cloned()
        .collect();

    CatalogueDiff {
        missing,
        unexpected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_size() {
        assert_eq!(all_breeds().len(), BREED_COUNT);
    }

    #[test]
    fn test_known_breeds() {
        assert!(is_known_breed("Gir"));
        assert!(is_known_breed("Red_Sindhi"));
        assert!(!is_known_breed("gir"));
        assert!(!is_known_breed("Red Sindhi"));
        assert!(!is_known_breed(""));
    }

    #[test]
    fn test_compare_matching_list() {
        let server: Vec<String> = all_breeds().into_iter().map(String::from).collect();
        assert!(compare_with_catalogue(&server).is_empty());
    }

    #[test]
    fn test_compare_reports_differently_spelled_classes() {
        let server: Vec<String> = all_breeds()
            .into_iter()
            .map(|breed| breed.replace('_', " "))
            .collect();
        let diff = compare_with_catalogue(&server);

        assert!(diff.missing.contains(&"Holstein_Friesian"));
        assert!(diff.unexpected.contains(&"Holstein Friesian".to_string()));
        assert!(!diff.missing.contains(&"Gir"));
        assert_eq!(diff.missing.len(), diff.unexpected.len());
    }
}
