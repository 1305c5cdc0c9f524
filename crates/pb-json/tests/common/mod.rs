#![allow(dead_code)]

use std::fs;
use std::path::Path;

use pb_reflect::{DescriptorPool, DynamicMessage, EnumDef, FieldDef, FieldType, MessageDef};

pub const COMPLEX: &str = "json2pb.test.ComplexMessage";
pub const SUB: &str = "json2pb.test.ComplexMessage.SubMessage";
pub const ENUM_MESSAGE: &str = "json2pb.test.EnumMessage";
pub const VALUES_ENUM: &str = "json2pb.test.ValuesEnum";
pub const ITEM: &str = "demo.Item";
pub const SCALARS: &str = "demo.Scalars";
pub const STRICT: &str = "demo.Strict";
pub const COLOR: &str = "demo.Color";

fn message(name: &str) -> FieldType {
    FieldType::Message(name.to_string())
}

fn enumeration(name: &str) -> FieldType {
    FieldType::Enum(name.to_string())
}

pub fn pool() -> DescriptorPool {
    DescriptorPool::builder()
        .enumeration(
            EnumDef::new("json2pb.test.ComplexMessage.Kind")
                .value("VALUE1", 1)
                .value("VALUE2", 2),
        )
        .enumeration(EnumDef::new(VALUES_ENUM).value("VALUE_1", 1).value("VALUE_2", 2))
        .enumeration(
            EnumDef::new(COLOR)
                .value("COLOR_UNSET", 0)
                .value("LIGHT_RED", 1)
                .value("DARK_BLUE", 2),
        )
        .message(MessageDef::new("json2pb.test.ComplexMessage.SubMessage.Echo").field(
            FieldDef::optional("text", 1, FieldType::String),
        ))
        .message(
            MessageDef::new(SUB)
                .field(FieldDef::optional("field", 1, FieldType::String))
                .field(FieldDef::repeated(
                    "echo",
                    2,
                    message("json2pb.test.ComplexMessage.SubMessage.Echo"),
                )),
        )
        .message(
            MessageDef::new(COMPLEX)
                .field(FieldDef::optional("_str", 1, FieldType::String))
                .field(FieldDef::optional("_bin", 2, FieldType::Bytes))
                .field(FieldDef::optional("_bool", 3, FieldType::Bool))
                .field(FieldDef::optional("_float", 4, FieldType::Float))
                .field(FieldDef::repeated("_int", 5, FieldType::Int32))
                .field(FieldDef::repeated("_enum", 6, enumeration("json2pb.test.ComplexMessage.Kind")))
                .field(FieldDef::repeated("str_list", 7, FieldType::String))
                .field(FieldDef::optional("sub", 8, message(SUB))),
        )
        .message(MessageDef::new("company.Structure").field(FieldDef::optional("id", 1, FieldType::Int32)))
        .message(MessageDef::new(ENUM_MESSAGE).field(FieldDef::repeated("enums", 1, enumeration(VALUES_ENUM))))
        .message(
            MessageDef::new(ITEM)
                .field(FieldDef::optional("name", 1, FieldType::String))
                .field(FieldDef::optional("id", 2, FieldType::Int32))
                .field(FieldDef::repeated("tags", 3, FieldType::String)),
        )
        .message(
            MessageDef::new(SCALARS)
                .field(FieldDef::optional("d", 1, FieldType::Double))
                .field(FieldDef::optional("f", 2, FieldType::Float))
                .field(FieldDef::optional("i32", 3, FieldType::Int32))
                .field(FieldDef::optional("i64", 4, FieldType::Int64))
                .field(FieldDef::optional("u32", 5, FieldType::Uint32))
                .field(FieldDef::optional("u64", 6, FieldType::Uint64))
                .field(FieldDef::optional("flag", 7, FieldType::Bool))
                .field(FieldDef::optional("text", 8, FieldType::String))
                .field(FieldDef::optional("blob", 9, FieldType::Bytes))
                .field(FieldDef::optional("color", 10, enumeration(COLOR)))
                .field(FieldDef::repeated("colors", 11, enumeration(COLOR)))
                .field(FieldDef::optional("item", 12, message(ITEM)))
                .field(FieldDef::repeated("items", 13, message(ITEM))),
        )
        .message(
            MessageDef::new(STRICT)
                .field(FieldDef::required("id", 1, FieldType::Int32))
                .field(FieldDef::required("note", 2, FieldType::String))
                .field(FieldDef::required("color", 3, enumeration(COLOR)))
                .field(FieldDef::required("item", 4, message(ITEM)))
                .field(FieldDef::optional("spare", 5, FieldType::Int32)),
        )
        .extension("json2pb.test", COMPLEX, FieldDef::optional("e_bool", 100, FieldType::Bool))
        .extension("json2pb.test", COMPLEX, FieldDef::optional("e_int", 101, FieldType::Int32))
        .extension("company", COMPLEX, FieldDef::optional("structure", 102, message("company.Structure")))
        .extension("company", SUB, FieldDef::optional("id", 100, FieldType::Int32))
        .extension("company", SUB, FieldDef::optional("sub_structure", 101, message("company.Structure")))
        .build()
        .expect("test pool must build")
}

pub fn new_message(full_name: &str) -> DynamicMessage {
    let desc = pool()
        .get_message_by_name(full_name)
        .unwrap_or_else(|| panic!("unknown test message {full_name}"));
    DynamicMessage::new(desc)
}

pub fn fixture(name: &str) -> Vec<u8> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read(&path).unwrap_or_else(|err| panic!("fixture {} unreadable: {err}", path.display()))
}
