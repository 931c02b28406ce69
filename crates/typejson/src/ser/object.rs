use super::{EXT_REF, EXT_TYPE, Encoder};
use crate::encode::primitives;
use crate::error::{Error, Result};
use crate::manager::JsonItem;
use crate::number;
use crate::reflection::MemberDescriptor;
use crate::types::{TriState, Type};
use crate::value::{List, ObjectRef, Value};

impl Encoder<'_> {
    /// Writes a composite object as `{...}`.
    ///
    /// An object seen before in this call is written as a back-reference
    /// `{"$i":n}` when extensions are on and references are not inlined.
    /// Depth counts only composite objects.
    pub(crate) fn write_object(&mut self, obj: &ObjectRef) -> Result<()> {
        let seen = self.visited.get(&obj.id()).map(|(order, _)| *order);
        if seen.is_none() {
            let order = self.visited.len() + 1;
            self.visited.insert(obj.id(), (order, obj.clone()));
        }
        if let Some(order) = seen {
            if self.depth > 0
                && self.opts.use_extensions
                && !self.opts.inline_circular_references
            {
                self.w.push('{');
                self.write_string_fast(EXT_REF);
                self.w.push(':');
                number::push_u64(self.w.buffer_mut(), order as u64);
                self.w.push('}');
                return Ok(());
            }
        }

        let descriptor = self.manager.descriptor(obj.type_of());
        let interceptor = descriptor.interceptor.clone();
        if let Some(hooks) = &interceptor {
            if !hooks.on_serializing(obj) {
                self.skipped = true;
                return Ok(());
            }
        }

        self.w.push('{');
        if self.opts.global_types_active() {
            self.w.mark_insertion_point();
        }
        self.depth += 1;
        if self.depth > self.opts.serializer_max_depth {
            tracing::debug!(
                type_name = obj.type_of().name(),
                max = self.opts.serializer_max_depth,
                "maximum depth exceeded"
            );
            return Err(Error::DepthExceeded {
                max: self.opts.serializer_max_depth,
            });
        }

        let mut append = false;
        if self.opts.use_extensions {
            if self.opts.using_global_types {
                let id = self.global_type_id(&descriptor.assembly_name);
                let mut text = String::new();
                number::push_u64(&mut text, id as u64);
                self.write_pair_fast(EXT_TYPE, &text);
            } else {
                self.write_pair_fast(EXT_TYPE, &descriptor.assembly_name);
            }
            append = true;
        }

        let show_properties = self.opts.read_only_properties_visible();
        let show_fields = self.opts.read_only_fields_visible();
        for member in &descriptor.members {
            match member.serializable {
                TriState::False => continue,
                TriState::True => {}
                TriState::Default => {
                    if member.is_static && !self.opts.serialize_static_members {
                        continue;
                    }
                    if member.is_read_only
                        && ((member.is_property && !show_properties)
                            || (!member.is_property && !show_fields))
                    {
                        continue;
                    }
                }
            }

            let mut item = JsonItem {
                name: member.member_name.clone(),
                value: member.get(obj),
            };
            if let Some(hooks) = &interceptor {
                match hooks.on_serializing_member(obj, item) {
                    Some(it) => item = it,
                    None => continue,
                }
            }
            if let Some(convert) = &member.converter {
                item = convert(item);
            }
            if let Some(convert) = &member.item_converter {
                let converted = item.value.iter_items().map(|items| {
                    items
                        .map(|v| convert(JsonItem::new(item.name.clone(), v)).value)
                        .collect::<Vec<Value>>()
                });
                if let Some(converted) = converted {
                    item.value = Value::List(List::of(&Type::any(), converted));
                }
            }

            if self.skip_member(member, &item.value) {
                continue;
            }

            let start = self.w.len();
            if append {
                self.w.push(',');
            }
            let name = member.name_for(&item.value);
            if member.specific_name {
                self.write_string_fast(name);
                self.w.push(':');
            } else {
                self.write_name(name);
            }
            if member.converter.is_none() && member.item_converter.is_none() {
                if item.value.is_null() {
                    self.w.push_str(primitives::format_null());
                } else {
                    (member.writer)(self, &item.value)?;
                }
            } else {
                self.write_value(&item.value)?;
            }
            if self.take_skipped() {
                self.w.truncate(start);
                continue;
            }
            append = true;
        }

        if let Some(hooks) = &interceptor {
            for extra in hooks.serialize_extra_values(obj) {
                let start = self.w.len();
                if append {
                    self.w.push(',');
                }
                self.write_pair(&extra.name, &extra.value)?;
                if self.take_skipped() {
                    self.w.truncate(start);
                } else {
                    append = true;
                }
            }
            hooks.on_serialized(obj);
        }

        self.depth -= 1;
        self.w.push('}');
        Ok(())
    }

    fn skip_member(&self, member: &MemberDescriptor, value: &Value) -> bool {
        if !self.opts.serialize_null_values && value.is_null() {
            return true;
        }
        if member.default_value.as_ref() == Some(value) {
            return true;
        }
        member.is_collection
            && !self.opts.serialize_empty_collections
            && value.collection_len() == Some(0)
    }
}
