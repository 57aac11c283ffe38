//! Tag spelling canonicalization.
//!
//! Catalog tags mix cases and Han scripts; spellings that differ only
//! in case, in full-width vs. ASCII forms or in traditional vs.
//! simplified characters should be counted as one tag.

use std::{collections::HashMap, sync::OnceLock};

/// Raw spelling to canonical key mapping, built once from the
/// complete observed vocabulary after collection finishes and
/// consumed by the merge step only.
#[derive(Clone, Debug, Default)]
pub struct CanonTable {
    map: HashMap<String, String>,
}

impl CanonTable {
    pub fn build<'a>(
        vocabulary: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let map = vocabulary
            .into_iter()
            .map(|raw| (raw.to_string(), canonical_key(raw)))
            .collect();
        CanonTable { map }
    }

    /// Canonical key for a raw spelling in the vocabulary the table
    /// was built from.
    pub fn key<'a>(&'a self, raw: &'a str) -> &'a str {
        self.map.get(raw).map_or(raw, String::as_str)
    }
}

/// Normalize script variants to one target script, then case fold.
/// Two raw tags are the same tag iff their canonical keys are equal.
pub fn canonical_key(tag: &str) -> String {
    tag.chars()
        .map(fold_char)
        .collect::<String>()
        .to_lowercase()
}

fn fold_char(c: char) -> char {
    match c {
        // Ideographic space and the full-width ASCII block.
        '\u{3000}' => ' ',
        '\u{ff01}'..='\u{ff5e}' => {
            char::from_u32(c as u32 - 0xfee0).unwrap_or(c)
        }
        _ => simplified(c),
    }
}

/// Traditional Han characters folded to their simplified forms.
/// Covers the traditional forms that show up in catalog tag
/// vocabulary rather than the full conversion tables.
fn simplified(c: char) -> char {
    static TABLE: OnceLock<HashMap<char, char>> = OnceLock::new();
    let table = TABLE.get_or_init(|| {
        [
            ('愛', '爱'),
            ('惡', '恶'),
            ('戰', '战'),
            ('鬥', '斗'),
            ('國', '国'),
            ('學', '学'),
            ('園', '园'),
            ('藝', '艺'),
            ('術', '术'),
            ('語', '语'),
            ('畫', '画'),
            ('劇', '剧'),
            ('場', '场'),
            ('師', '师'),
            ('歷', '历'),
            ('戀', '恋'),
            ('樂', '乐'),
            ('寫', '写'),
            ('說', '说'),
            ('讀', '读'),
            ('書', '书'),
            ('電', '电'),
            ('視', '视'),
            ('機', '机'),
            ('動', '动'),
            ('輕', '轻'),
            ('類', '类'),
            ('風', '风'),
            ('運', '运'),
            ('熱', '热'),
            ('憶', '忆'),
            ('夢', '梦'),
            ('陸', '陆'),
            ('臺', '台'),
            ('灣', '湾'),
            ('歡', '欢'),
            ('樣', '样'),
            ('組', '组'),
            ('織', '织'),
            ('續', '续'),
            ('經', '经'),
            ('當', '当'),
            ('後', '后'),
            ('會', '会'),
            ('傳', '传'),
            ('記', '记'),
            ('誌', '志'),
            ('銀', '银'),
            ('鐵', '铁'),
            ('勝', '胜'),
            ('殘', '残'),
            ('聲', '声'),
            ('優', '优'),
            ('級', '级'),
            ('紀', '纪'),
            ('錄', '录'),
            ('長', '长'),
            ('門', '门'),
            ('間', '间'),
            ('開', '开'),
            ('關', '关'),
            ('陽', '阳'),
            ('陰', '阴'),
            ('雲', '云'),
            ('飛', '飞'),
            ('馬', '马'),
            ('鳥', '鸟'),
            ('龍', '龙'),
            ('偽', '伪'),
            ('傑', '杰'),
            ('備', '备'),
            ('兒', '儿'),
            ('內', '内'),
            ('兩', '两'),
            ('軍', '军'),
            ('遊', '游'),
            ('戲', '戏'),
            ('點', '点'),
            ('體', '体'),
            ('館', '馆'),
            ('驚', '惊'),
            ('談', '谈'),
            ('請', '请'),
            ('謎', '谜'),
            ('識', '识'),
            ('譯', '译'),
            ('護', '护'),
            ('變', '变'),
            ('貓', '猫'),
            ('貴', '贵'),
            ('買', '买'),
            ('賣', '卖'),
            ('質', '质'),
            ('賽', '赛'),
            ('車', '车'),
            ('輪', '轮'),
            ('轉', '转'),
            ('連', '连'),
            ('週', '周'),
            ('進', '进'),
            ('達', '达'),
            ('遠', '远'),
            ('選', '选'),
            ('還', '还'),
            ('醫', '医'),
            ('鈴', '铃'),
            ('錯', '错'),
            ('鍵', '键'),
            ('鏡', '镜'),
            ('隊', '队'),
            ('階', '阶'),
            ('隱', '隐'),
            ('雜', '杂'),
            ('難', '难'),
            ('靈', '灵'),
            ('靜', '静'),
            ('頭', '头'),
            ('題', '题'),
            ('顏', '颜'),
            ('願', '愿'),
            ('養', '养'),
            ('異', '异'),
            ('發', '发'),
            ('現', '现'),
            ('實', '实'),
            ('蘿', '萝'),
            ('殼', '壳'),
            ('偵', '侦'),
            ('無', '无'),
            ('萬', '万'),
            ('漢', '汉'),
            ('華', '华'),
            ('義', '义'),
            ('鋼', '钢'),
            ('彈', '弹'),
            ('獸', '兽'),
            ('島', '岛'),
            ('寶', '宝'),
            ('魯', '鲁'),
            ('險', '险'),
            ('團', '团'),
            ('圖', '图'),
            ('聖', '圣'),
            ('歐', '欧'),
            ('鄉', '乡'),
            ('釣', '钓'),
            ('狹', '狭'),
            ('纖', '纤'),
            ('細', '细'),
            ('緣', '缘'),
            ('線', '线'),
            ('緊', '紧'),
            ('約', '约'),
            ('純', '纯'),
            ('絕', '绝'),
            ('綜', '综'),
            ('維', '维'),
            ('網', '网'),
            ('羅', '罗'),
            ('舊', '旧'),
            ('蟲', '虫'),
            ('裝', '装'),
            ('見', '见'),
            ('覺', '觉'),
            ('觀', '观'),
            ('計', '计'),
            ('設', '设'),
            ('評', '评'),
            ('詞', '词'),
            ('詩', '诗'),
            ('話', '话'),
            ('誠', '诚'),
            ('論', '论'),
            ('謠', '谣'),
            ('譜', '谱'),
            ('讚', '赞'),
        ]
        .into_iter()
        .collect()
    });
    table.get(&c).copied().unwrap_or(c)
}
