// Generated by tablegen at 2024-01-01 00:00:00.000.
// Changes are overwritten on the next generation run.

use tablegen::runtime::*;

/// Heroes
#[derive(Debug, Clone, PartialEq)]
pub struct DRHero {
    id: i32,
    name: String,
    level: u16,
    hp: i64,
    speed: f32,
    enabled: bool,
    r#type: u8,
    position: Vector3,
    skill1: i32,
    skill2: i32,
    skill_items: Vec<(i32, i32)>,
}

impl DRHero {
    /// Hero id
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Level cap
    pub fn level(&self) -> u16 {
        self.level
    }

    /// Hit points
    pub fn hp(&self) -> i64 {
        self.hp
    }

    /// Move speed
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Playable
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Hero class
    pub fn r#type(&self) -> u8 {
        self.r#type
    }

    /// Spawn point
    pub fn position(&self) -> Vector3 {
        self.position
    }

    /// First skill
    pub fn skill1(&self) -> i32 {
        self.skill1
    }

    /// Second skill
    pub fn skill2(&self) -> i32 {
        self.skill2
    }

    pub fn parse_data_row(data_row_string: &str) -> Result<Self, DataRowError> {
        let mut fields = TextRowFields::new(data_row_string, &['"']);
        let mut row = Self {
            id: fields.seek(1).next::<i32>()?,
            name: fields.seek(3).next::<String>()?,
            level: fields.seek(4).next::<u16>()?,
            hp: fields.seek(5).next::<i64>()?,
            speed: fields.seek(6).next::<f32>()?,
            enabled: fields.seek(7).next::<bool>()?,
            r#type: fields.seek(8).next::<u8>()?,
            position: fields.seek(9).next_with(tablegen::runtime::parse_vector3)?,
            skill1: fields.seek(10).next::<i32>()?,
            skill2: fields.seek(11).next::<i32>()?,
            skill_items: Vec::new(),
        };
        row.generate_property_array();
        Ok(row)
    }

    pub fn parse_data_row_bytes(data_row_bytes: &[u8]) -> Result<Self, DataRowError> {
        let mut reader = DataRowReader::new(data_row_bytes);
        let row = Self::read_data_row(&mut reader)?;
        if !reader.is_at_end() {
            return Err(DataRowError::Malformed(format!(
                "{} trailing bytes after row",
                data_row_bytes.len() - reader.position()
            )));
        }
        Ok(row)
    }

    /// Read one record; records are stored back to back without delimiters.
    pub fn read_data_row(reader: &mut DataRowReader<'_>) -> Result<Self, DataRowError> {
        let mut row = Self {
            id: reader.read_7bit_encoded_i32()?,
            name: reader.read_string()?,
            level: reader.read_7bit_encoded_u16()?,
            hp: reader.read_7bit_encoded_i64()?,
            speed: reader.read_f32()?,
            enabled: reader.read_bool()?,
            r#type: reader.read_u8()?,
            position: tablegen::runtime::read_vector3(reader)?,
            skill1: reader.read_7bit_encoded_i32()?,
            skill2: reader.read_7bit_encoded_i32()?,
            skill_items: Vec::new(),
        };
        row.generate_property_array();
        Ok(row)
    }

    fn generate_property_array(&mut self) {
        self.skill_items = vec![(1, self.skill1), (2, self.skill2)];
    }

    pub fn skill_count(&self) -> usize {
        self.skill_items.len()
    }

    pub fn get_skill(&self, id: i32) -> Result<i32, DataRowError> {
        self.skill_items
            .iter()
            .find(|(key, _)| *key == id)
            .map(|(_, value)| *value)
            .ok_or(DataRowError::Lookup {
                accessor: "get_skill",
                key: id,
            })
    }

    pub fn get_skill_at(&self, index: usize) -> Result<i32, DataRowError> {
        self.skill_items
            .get(index)
            .map(|(_, value)| *value)
            .ok_or(DataRowError::Range {
                accessor: "get_skill_at",
                index,
            })
    }
}
