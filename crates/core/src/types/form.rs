//! Application form types and their field catalogue.
//!
//! Every submittable form type (food, goods, workshop) is described by a
//! static catalogue of sections and fields. The same catalogue drives the
//! HTML input forms, required-field validation and the read-only detail view,
//! so the three can never drift apart.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The kind of application a form payload represents.
///
/// Stored inside the payload as `formType`. Anything other than the three
/// known values (including a missing key) is a [`FormType::General`] form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormType {
    /// Food stalls, kitchen cars and tents.
    Food,
    /// Goods and crafts.
    Goods,
    /// Workshops and hands-on experiences.
    Workshop,
    /// Free-form payload without a catalogue.
    General,
}

impl FormType {
    /// The form types a vendor can pick from the dashboard.
    pub const SUBMITTABLE: [Self; 3] = [Self::Food, Self::Goods, Self::Workshop];

    /// Every value, for filter dropdowns.
    pub const ALL: [Self; 4] = [Self::Food, Self::Goods, Self::Workshop, Self::General];

    /// Read the form type from a payload's `formType` key.
    #[must_use]
    pub fn from_payload(data: &serde_json::Value) -> Self {
        data.get("formType")
            .and_then(serde_json::Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or(Self::General)
    }

    /// Wire value stored in the payload.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Goods => "goods",
            Self::Workshop => "workshop",
            Self::General => "general",
        }
    }

    /// Short Japanese label used in tables and badges.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Food => "飲食",
            Self::Goods => "物販",
            Self::Workshop => "ワークショップ",
            Self::General => "その他",
        }
    }

    /// Heading shown above the input form.
    #[must_use]
    pub const fn form_title(self) -> &'static str {
        match self {
            Self::Food => "飲食出店申込フォーム",
            Self::Goods => "物販・雑貨出店申込フォーム",
            Self::Workshop => "ワークショップ・体験・その他出店申込フォーム",
            Self::General => "出店申込",
        }
    }

    /// The catalogue sections for this form type. Empty for general forms.
    #[must_use]
    pub const fn sections(self) -> &'static [Section] {
        match self {
            Self::Food => FOOD_SECTIONS,
            Self::Goods => GOODS_SECTIONS,
            Self::Workshop => WORKSHOP_SECTIONS,
            Self::General => &[],
        }
    }

    /// Iterate every field of this form type in display order.
    pub fn fields(self) -> impl Iterator<Item = &'static Field> {
        self.sections().iter().flat_map(|s| s.fields.iter())
    }

    /// Keys that must be present and non-empty on submission.
    #[must_use]
    pub fn required_fields(self) -> Vec<&'static str> {
        self.fields().filter(|f| f.required).map(|f| f.key).collect()
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FormType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "food" => Ok(Self::Food),
            "goods" => Ok(Self::Goods),
            "workshop" => Ok(Self::Workshop),
            "general" => Ok(Self::General),
            _ => Err(format!("invalid form type: {s}")),
        }
    }
}

/// Keys that must be present for the given form type.
///
/// Free function form of [`FormType::required_fields`].
#[must_use]
pub fn required_fields(form_type: FormType) -> Vec<&'static str> {
    form_type.required_fields()
}

/// A titled group of fields.
#[derive(Debug)]
pub struct Section {
    pub title: &'static str,
    pub fields: &'static [Field],
}

/// One input of an application form.
#[derive(Debug)]
pub struct Field {
    /// Payload key.
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub placeholder: Option<&'static str>,
}

/// A selectable value and its label.
#[derive(Debug)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
}

/// How a field is entered and displayed.
#[derive(Debug)]
pub enum FieldKind {
    Text,
    Tel,
    Email,
    /// Repeat of the email address; checked on submit, hidden in detail views.
    EmailConfirm,
    LongText,
    Select(&'static [Choice]),
    Radio(&'static [Choice]),
    /// Month numbers 1-12, multi-select.
    Months,
    /// Free multi-select over fixed values.
    Checkboxes(&'static [&'static str]),
    /// Document upload. Only the file name is kept.
    File,
    /// Terms-of-participation checkbox.
    Agreement,
}

impl FieldKind {
    /// Whether the payload value is a JSON array.
    #[must_use]
    pub const fn is_multi(&self) -> bool {
        matches!(self, Self::Months | Self::Checkboxes(_))
    }
}

const fn field(key: &'static str, label: &'static str, kind: FieldKind) -> Field {
    Field {
        key,
        label,
        kind,
        required: false,
        placeholder: None,
    }
}

const fn required(key: &'static str, label: &'static str, kind: FieldKind) -> Field {
    Field {
        key,
        label,
        kind,
        required: true,
        placeholder: None,
    }
}

impl Field {
    const fn hint(mut self, placeholder: &'static str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }
}

const BOOTH_TYPES: &[Choice] = &[
    Choice { value: "yatai", label: "屋台" },
    Choice { value: "kitchencar", label: "キッチンカー" },
    Choice { value: "tent", label: "テント" },
];

const FOOD_PLANS: &[Choice] = &[
    Choice { value: "1month", label: "1ヶ月" },
    Choice { value: "6months", label: "6ヶ月" },
    Choice { value: "1yearA", label: "1年間A" },
    Choice { value: "1yearB", label: "1年間B" },
];

const PLANS: &[Choice] = &[
    Choice { value: "1month", label: "1ヶ月" },
    Choice { value: "6months", label: "6ヶ月" },
    Choice { value: "1year", label: "1年間" },
];

const COOKING_METHODS: &[Choice] = &[
    Choice { value: "fire", label: "火気使用あり" },
    Choice { value: "electric", label: "電気調理のみ" },
];

const INSURANCE: &[Choice] = &[
    Choice { value: "enrolled", label: "加入している" },
    Choice { value: "considering", label: "検討中" },
    Choice { value: "notEnrolled", label: "加入していない" },
];

const ALLERGENS: &[&str] = &["卵", "乳", "小麦", "えび", "かに", "そば", "落花生"];

const AGREEMENT_LABEL: &str = "出店規約・注意事項を確認し、内容に同意します";
const SNS_HINT: &str = "Instagram / X / TikTok など";

const FOOD_SECTIONS: &[Section] = &[
    Section {
        title: "基本情報",
        fields: &[
            required("shopName", "屋号・店舗名", FieldKind::Text).hint("例：〇〇キッチン、△△カフェ"),
            required("contactPerson", "担当者名", FieldKind::Text).hint("代表者または現場責任者"),
            required("phone", "連絡先電話番号", FieldKind::Tel).hint("携帯番号・緊急連絡用"),
            required("email", "メールアドレス", FieldKind::Email),
            required("emailConfirm", "メールアドレス（確認用）", FieldKind::EmailConfirm),
            required("boothType", "出店形態", FieldKind::Select(BOOTH_TYPES)),
            required("participationMonths", "出店希望月", FieldKind::Months),
            required("participationPlan", "出店プラン", FieldKind::Select(FOOD_PLANS)),
        ],
    },
    Section {
        title: "事業内容・販売内容",
        fields: &[
            required("businessType", "事業の業種", FieldKind::Text)
                .hint("例：焼きそば、唐揚げ、クラフトドリンクなど"),
            required("menuItems", "主な販売メニュー", FieldKind::LongText)
                .hint("提供する料理・ドリンクを具体的に記載"),
            required("priceRange", "販売価格帯", FieldKind::Text).hint("例：¥500〜¥1,000"),
            required("cookingMethod", "調理方法", FieldKind::Select(COOKING_METHODS)),
            field("allergens", "アレルゲン表示", FieldKind::Checkboxes(ALLERGENS)),
            field("allergensOther", "その他のアレルゲン", FieldKind::Text),
            field("vehicleSize", "車両サイズ（キッチンカーの場合）", FieldKind::Text)
                .hint("例：全長5m以内・高さ2.5m以内"),
            required("requiredSpace", "必要スペース", FieldKind::Text).hint("例：3m×3m、5m×3mなど"),
            field("salesDescription", "販売内容・PR文", FieldKind::LongText),
        ],
    },
    Section {
        title: "書類・確認項目",
        fields: &[
            required("businessPermit", "営業許可証", FieldKind::File),
            required("foodSafetyCert", "食品衛生責任者証", FieldKind::File),
            required("insuranceStatus", "賠償責任保険（PL保険等）", FieldKind::Radio(INSURANCE)),
            field("insuranceCert", "保険証書", FieldKind::File),
        ],
    },
    Section {
        title: "規約・同意",
        fields: &[
            required("agreementCheck", AGREEMENT_LABEL, FieldKind::Agreement),
            required("companyName", "会社名", FieldKind::Text),
            required("representativeName", "代表者氏名", FieldKind::Text),
            required("companyAddress", "住所", FieldKind::Text),
        ],
    },
    Section {
        title: "その他",
        fields: &[
            field("snsLinks", "SNSリンク", FieldKind::LongText).hint(SNS_HINT),
            field("remarks", "備考欄", FieldKind::LongText),
        ],
    },
];

const GOODS_SECTIONS: &[Section] = &[
    Section {
        title: "基本情報",
        fields: &[
            required("brandName", "屋号・ブランド名", FieldKind::Text).hint("例：〇〇雑貨、△△クラフト"),
            required("contactPerson", "担当者名", FieldKind::Text),
            required("phone", "連絡先電話番号", FieldKind::Tel).hint("携帯番号"),
            required("email", "メールアドレス", FieldKind::Email),
            required("emailConfirm", "メールアドレス（確認用）", FieldKind::EmailConfirm),
            required("participationMonths", "出店希望月", FieldKind::Months),
            required("participationPlan", "出店プラン", FieldKind::Select(PLANS)),
        ],
    },
    Section {
        title: "販売内容",
        fields: &[
            required("productType", "取り扱い商品・販売内容", FieldKind::Text)
                .hint("例：アクセサリー、アパレル、インテリア雑貨など"),
            required("productFeatures", "商品の特徴やこだわり", FieldKind::LongText)
                .hint("例：ハンドメイド、オリジナルブランド、輸入雑貨など"),
            required("priceRange", "価格帯", FieldKind::Text).hint("例：¥500〜¥5,000"),
            field("salesDescription", "販売内容・PR文", FieldKind::LongText),
        ],
    },
    Section {
        title: "書類・確認項目",
        fields: &[
            required("agreementCheck", AGREEMENT_LABEL, FieldKind::Agreement),
            required("companyName", "会社名", FieldKind::Text),
            required("representativeName", "代表者氏名", FieldKind::Text),
            required("companyAddress", "住所", FieldKind::Text),
            field("productPhotos", "商品・ブース写真", FieldKind::File),
        ],
    },
    Section {
        title: "その他",
        fields: &[
            field("snsLinks", "SNSリンク", FieldKind::LongText).hint(SNS_HINT),
            field("remarks", "備考欄", FieldKind::LongText),
        ],
    },
];

const WORKSHOP_SECTIONS: &[Section] = &[
    Section {
        title: "基本情報",
        fields: &[
            required("brandName", "屋号・ブランド名", FieldKind::Text)
                .hint("例：〇〇ワークショップ、△△体験"),
            required("contactPerson", "担当者名", FieldKind::Text),
            required("phone", "連絡先電話番号", FieldKind::Tel).hint("携帯番号"),
            required("email", "メールアドレス", FieldKind::Email),
            required("emailConfirm", "メールアドレス（確認用）", FieldKind::EmailConfirm),
            required("participationMonths", "出店希望月", FieldKind::Months),
            required("participationPlan", "出店プラン", FieldKind::Select(PLANS)),
        ],
    },
    Section {
        title: "実施内容",
        fields: &[
            required("activityContent", "実施内容・体験内容", FieldKind::LongText)
                .hint("例：アクセサリー作り、占い、ハンドマッサージなど"),
            required("durationAndAge", "所要時間・対象年齢", FieldKind::Text)
                .hint("例：15分程度、小学生以上"),
            required("participationFee", "参加費", FieldKind::Text).hint("例：¥500〜、無料"),
            required("materialsTools", "必要な材料・道具", FieldKind::LongText),
            required("boothSpace", "ブーススペース必要サイズ", FieldKind::Text)
                .hint("例：2m×2m、テーブル1台程度"),
            field("detailedDescription", "詳細説明・PR文", FieldKind::LongText),
        ],
    },
    Section {
        title: "書類・確認項目",
        fields: &[
            required("agreementCheck", AGREEMENT_LABEL, FieldKind::Agreement),
            required("companyName", "会社名", FieldKind::Text),
            required("representativeName", "代表者氏名", FieldKind::Text),
            required("companyAddress", "住所", FieldKind::Text),
            field("activityPhotos", "実施内容・ブース写真", FieldKind::File),
        ],
    },
    Section {
        title: "その他",
        fields: &[
            field("snsLinks", "SNSリンク", FieldKind::LongText).hint(SNS_HINT),
            field("remarks", "備考欄", FieldKind::LongText),
        ],
    },
];

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_payload() {
        assert_eq!(FormType::from_payload(&json!({"formType": "food"})), FormType::Food);
        assert_eq!(
            FormType::from_payload(&json!({"formType": "workshop"})),
            FormType::Workshop
        );
        assert_eq!(
            FormType::from_payload(&json!({"formType": "raffle"})),
            FormType::General
        );
        assert_eq!(FormType::from_payload(&json!({})), FormType::General);
        assert_eq!(
            FormType::from_payload(&json!({"formType": 3})),
            FormType::General
        );
    }

    #[test]
    fn test_keys_are_unique_per_form() {
        for form_type in FormType::SUBMITTABLE {
            let mut keys: Vec<_> = form_type.fields().map(|f| f.key).collect();
            let total = keys.len();
            keys.sort_unstable();
            keys.dedup();
            assert_eq!(keys.len(), total, "duplicate key in {form_type}");
        }
    }

    #[test]
    fn test_every_submittable_form_names_its_shop() {
        // Shop creation falls back through these keys
        assert!(FormType::Food.required_fields().contains(&"shopName"));
        assert!(FormType::Goods.required_fields().contains(&"brandName"));
        assert!(FormType::Workshop.required_fields().contains(&"brandName"));
    }

    #[test]
    fn test_general_has_no_catalogue() {
        assert!(FormType::General.sections().is_empty());
        assert!(required_fields(FormType::General).is_empty());
    }

    #[test]
    fn test_optional_fields_are_not_required() {
        let required = FormType::Food.required_fields();
        assert!(!required.contains(&"vehicleSize"));
        assert!(!required.contains(&"insuranceCert"));
        assert!(required.contains(&"businessPermit"));
    }

    #[test]
    fn test_roundtrip_str() {
        for form_type in FormType::ALL {
            assert_eq!(form_type.as_str().parse::<FormType>().unwrap(), form_type);
        }
    }
}
