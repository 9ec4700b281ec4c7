//! 司机侧模型：资料、驾照、车辆、班次

use serde::{Deserialize, Serialize};

use crate::changed;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverLicense {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub series: String,
    #[serde(default)]
    pub doc_number: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub place_of_birth: String,
    #[serde(default)]
    pub date_of_issue: String,
    #[serde(default)]
    pub valid_until: String,
    #[serde(default)]
    pub residence: String,
    #[serde(default)]
    pub issued_unit: String,
    #[serde(default)]
    pub license_category: String,
}

impl DriverLicense {
    /// (字段名, 展示名, 取值)，供表单渲染与校验共用
    pub fn fields(&self) -> [(&'static str, &'static str, &str); 12] {
        [
            ("driver_license.name", "Имя", &self.name),
            ("driver_license.surname", "Фамилия", &self.surname),
            ("driver_license.lastname", "Отчество", &self.lastname),
            ("driver_license.series", "Серия", &self.series),
            ("driver_license.doc_number", "Номер", &self.doc_number),
            ("driver_license.date_of_birth", "Дата рождения", &self.date_of_birth),
            ("driver_license.place_of_birth", "Место рождения", &self.place_of_birth),
            ("driver_license.date_of_issue", "Дата выдачи", &self.date_of_issue),
            ("driver_license.valid_until", "Действует до", &self.valid_until),
            ("driver_license.residence", "Место жительства", &self.residence),
            ("driver_license.issued_unit", "Кем выдано", &self.issued_unit),
            ("driver_license.license_category", "Категория", &self.license_category),
        ]
    }

    /// 按 `fields()` 中的字段名取可写引用
    pub fn field_mut(&mut self, key: &str) -> Option<&mut String> {
        let field = match key.strip_prefix("driver_license.")? {
            "name" => &mut self.name,
            "surname" => &mut self.surname,
            "lastname" => &mut self.lastname,
            "series" => &mut self.series,
            "doc_number" => &mut self.doc_number,
            "date_of_birth" => &mut self.date_of_birth,
            "place_of_birth" => &mut self.place_of_birth,
            "date_of_issue" => &mut self.date_of_issue,
            "valid_until" => &mut self.valid_until,
            "residence" => &mut self.residence,
            "issued_unit" => &mut self.issued_unit,
            "license_category" => &mut self.license_category,
            _ => return None,
        };
        Some(field)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub driver_license: DriverLicense,
}

impl DriverInfo {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.surname, self.name).trim().to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDriverLicense {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_issue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub residence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDriverInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_license: Option<UpdateDriverLicense>,
}

impl UpdateDriverInfo {
    pub fn diff(before: &DriverInfo, after: &DriverInfo) -> Self {
        let (b, a) = (&before.driver_license, &after.driver_license);
        let license = UpdateDriverLicense {
            series: changed(&b.series, &a.series),
            doc_number: changed(&b.doc_number, &a.doc_number),
            date_of_issue: changed(&b.date_of_issue, &a.date_of_issue),
            valid_until: changed(&b.valid_until, &a.valid_until),
            residence: changed(&b.residence, &a.residence),
            issued_unit: changed(&b.issued_unit, &a.issued_unit),
            license_category: changed(&b.license_category, &a.license_category),
        };

        Self {
            name: changed(&before.name, &after.name),
            surname: changed(&before.surname, &after.surname),
            lastname: changed(&before.lastname, &after.lastname),
            phone_number: changed(&before.phone_number, &after.phone_number),
            driver_license: (license != UpdateDriverLicense::default()).then_some(license),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// =========================================================
// 车辆
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub brand: String,
    pub model: String,
    pub year: String,
    pub color: String,
    pub license_plate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

// =========================================================
// 班次
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    Active,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    pub id: String,
    pub start_time: String,
    #[serde(default)]
    pub end_time: Option<String>,
    pub status: ShiftStatus,
    #[serde(default)]
    pub total_orders: Option<u32>,
    #[serde(default)]
    pub total_earnings: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartShiftResponse {
    pub shift_id: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndShiftResponse {
    pub shift_id: String,
    #[serde(default)]
    pub total_orders: u32,
    #[serde(default)]
    pub total_earnings: f64,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_mut_covers_every_listed_field() {
        let mut license = DriverLicense::default();
        let keys: Vec<&str> = license.fields().iter().map(|(key, _, _)| *key).collect();
        for key in &keys {
            *license.field_mut(key).unwrap() = key.to_string();
        }
        for (key, _, value) in license.fields() {
            assert_eq!(key, value);
        }
        assert!(license.field_mut("series").is_none());
    }

    #[test]
    fn test_license_changes_are_nested() {
        let before = DriverInfo {
            name: "Oleg".into(),
            ..Default::default()
        };
        let mut after = before.clone();
        after.driver_license.license_category = "B".into();

        let update = UpdateDriverInfo::diff(&before, &after);
        assert!(update.name.is_none());
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({ "driver_license": { "license_category": "B" } })
        );
    }

    #[test]
    fn test_unchanged_license_is_omitted() {
        let info = DriverInfo::default();
        let mut edited = info.clone();
        edited.phone_number = "+79990000000".into();

        let update = UpdateDriverInfo::diff(&info, &edited);
        assert!(update.driver_license.is_none());
        assert!(!update.is_empty());
    }

    #[test]
    fn test_shift_without_end_time() {
        let shift: Shift = serde_json::from_str(
            r#"{"id":"s1","start_time":"2024-05-01T08:00:00Z","end_time":null,"status":"active"}"#,
        )
        .unwrap();
        assert_eq!(shift.status, ShiftStatus::Active);
        assert!(shift.end_time.is_none());
        assert!(shift.total_earnings.is_none());
    }
}
