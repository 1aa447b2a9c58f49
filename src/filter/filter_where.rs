use serde_json::Value;

use super::types::CertificateFilter;

const TAG_EXISTS: &str = "EXISTS (SELECT 1 FROM certificates_tags ct JOIN tags t ON t.id = ct.tag_id \
     WHERE ct.certificate_id = gc.id AND t.name ILIKE {})";

pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
    conditions: Vec<String>,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
            conditions: vec![],
        }
    }

    /// Returns the predicate text (without the WHERE keyword) and its bound values.
    /// An empty string means no predicates apply.
    pub fn generate(filter: &CertificateFilter, starting_param_index: usize) -> (String, Vec<Value>) {
        let mut filter_where = Self::new(starting_param_index);
        filter_where.build(filter)
    }

    fn build(&mut self, filter: &CertificateFilter) -> (String, Vec<Value>) {
        for tag_name in filter.tag_names() {
            let placeholder = self.like_param(tag_name);
            self.conditions.push(TAG_EXISTS.replace("{}", &placeholder));
        }
        if let Some(name) = filter.name() {
            let placeholder = self.like_param(name);
            self.conditions.push(format!("gc.name ILIKE {}", placeholder));
        }
        if let Some(description) = filter.description() {
            let placeholder = self.like_param(description);
            self.conditions.push(format!("gc.description ILIKE {}", placeholder));
        }

        (self.conditions.join(" AND "), self.param_values.clone())
    }

    fn like_param(&mut self, raw: &str) -> String {
        self.param(Value::String(format!("%{}%", escape_like(raw))))
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

/// Escapes LIKE wildcards so user text only matches literally.
pub fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
