use super::{EXT_SCHEMA, Encoder};
use crate::encode::primitives;
use crate::error::Result;
use crate::value::{DataSet, DataTable};

impl Encoder<'_> {
    pub(super) fn write_data_set(&mut self, ds: &DataSet) -> Result<()> {
        self.w.push('{');
        if self.opts.use_extensions {
            self.write_schema(&ds.name, &ds.tables)?;
        }
        for (i, table) in ds.tables.iter().enumerate() {
            if i > 0 || self.opts.use_extensions {
                self.w.push(',');
            }
            self.write_table_rows(table)?;
        }
        self.w.push('}');
        Ok(())
    }

    pub(super) fn write_data_table(&mut self, dt: &DataTable) -> Result<()> {
        self.w.push('{');
        if self.opts.use_extensions {
            self.write_schema(&dt.name, std::slice::from_ref(dt))?;
            self.w.push(',');
        }
        self.write_table_rows(dt)?;
        self.w.push('}');
        Ok(())
    }

    /// `"$schema":` followed by either the compact column listing or an XML schema string.
    fn write_schema(&mut self, name: &str, tables: &[DataTable]) -> Result<()> {
        self.write_string_fast(EXT_SCHEMA);
        self.w.push(':');
        if self.opts.use_optimized_dataset_schema {
            self.w.push_str("{\"Info\":[");
            let mut first = true;
            for table in tables {
                for column in &table.columns {
                    for part in [table.name.as_str(), column.name.as_str(), column.ty.name()] {
                        if !first {
                            self.w.push(',');
                        }
                        first = false;
                        self.write_string(part);
                    }
                }
            }
            self.w.push_str("],\"Name\":");
            self.write_string(name);
            self.w.push('}');
        } else {
            let xml = xml_schema(name, tables);
            self.write_string(&xml);
        }
        Ok(())
    }

    /// `"name":[[cell,...],...]`, cells in column order through runtime dispatch.
    fn write_table_rows(&mut self, table: &DataTable) -> Result<()> {
        self.write_string(&table.name);
        self.w.push_str(":[");
        for (r, row) in table.rows.iter().enumerate() {
            if r > 0 {
                self.w.push(',');
            }
            self.w.push('[');
            for (c, _) in table.columns.iter().enumerate() {
                if c > 0 {
                    self.w.push(',');
                }
                let start = self.w.len();
                if let Some(cell) = row.get(c) {
                    self.write_value(cell)?;
                }
                // a vetoed or missing cell still holds its column
                if self.take_skipped() || self.w.len() == start {
                    self.w.truncate(start);
                    self.w.push_str(primitives::format_null());
                }
            }
            self.w.push(']');
        }
        self.w.push(']');
        Ok(())
    }
}

fn xml_schema(name: &str, tables: &[DataTable]) -> String {
    let mut xml = format!("<xs:schema id=\"{}\">", xml_escape(name));
    for table in tables {
        xml.push_str(&format!(
            "<xs:element name=\"{}\"><xs:complexType><xs:sequence>",
            xml_escape(&table.name)
        ));
        for column in &table.columns {
            xml.push_str(&format!(
                "<xs:element name=\"{}\" type=\"{}\" minOccurs=\"0\" />",
                xml_escape(&column.name),
                xml_escape(column.ty.name())
            ));
        }
        xml.push_str("</xs:sequence></xs:complexType></xs:element>");
    }
    xml.push_str("</xs:schema>");
    xml
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
