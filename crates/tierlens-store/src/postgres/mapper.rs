use tierlens_core::{
    ColumnMatch, ColumnRecord, LayerRecord, RelationshipRecord, TableRecord, TransformationRecord,
};

use super::queries::{
    RawColumn, RawColumnMatch, RawEndpoints, RawLayer, RawRelationship, RawTable,
    RawTransformation,
};

pub fn map_layers(raw: Vec<RawLayer>) -> Vec<LayerRecord> {
    raw.into_iter()
        .map(|layer| LayerRecord {
            id: layer.id,
            name: layer.name,
            rank: layer.display_order,
            description: layer.description,
        })
        .collect()
}

pub fn map_table(raw: RawTable) -> TableRecord {
    TableRecord {
        id: raw.id,
        name: raw.name,
        description: raw.description,
        layer: raw.layer,
        layer_rank: raw.layer_rank,
    }
}

pub fn map_tables(raw: Vec<RawTable>) -> Vec<TableRecord> {
    raw.into_iter().map(map_table).collect()
}

fn map_column(raw: RawColumn) -> ColumnRecord {
    ColumnRecord {
        id: raw.id,
        table_id: raw.table_id,
        name: raw.name,
        data_type: raw.data_type,
        is_key: raw.is_key,
        is_nullable: raw.is_nullable,
    }
}

pub fn map_columns(raw: Vec<RawColumn>) -> Vec<ColumnRecord> {
    raw.into_iter().map(map_column).collect()
}

pub fn map_column_matches(raw: Vec<RawColumnMatch>) -> Vec<ColumnMatch> {
    raw.into_iter()
        .map(|row| ColumnMatch {
            column: ColumnRecord {
                id: row.id,
                table_id: row.table_id,
                name: row.name,
                data_type: row.data_type,
                is_key: row.is_key,
                is_nullable: row.is_nullable,
            },
            table_name: row.table_name,
            layer: row.layer,
        })
        .collect()
}

fn map_endpoints(raw: RawEndpoints) -> (TableRecord, TableRecord) {
    let source = TableRecord {
        id: raw.source_id,
        name: raw.source_name,
        description: raw.source_description,
        layer: raw.source_layer,
        layer_rank: raw.source_rank,
    };
    let target = TableRecord {
        id: raw.target_id,
        name: raw.target_name,
        description: raw.target_description,
        layer: raw.target_layer,
        layer_rank: raw.target_rank,
    };
    (source, target)
}

pub fn map_relationships(raw: Vec<RawRelationship>) -> Vec<RelationshipRecord> {
    raw.into_iter()
        .map(|rel| {
            let (source, target) = map_endpoints(rel.endpoints);
            RelationshipRecord {
                id: rel.id,
                kind: rel.kind,
                description: rel.description,
                confidence: rel.confidence,
                source,
                target,
            }
        })
        .collect()
}

pub fn map_transformations(raw: Vec<RawTransformation>) -> Vec<TransformationRecord> {
    raw.into_iter()
        .map(|tr| {
            let (source, target) = map_endpoints(tr.endpoints);
            TransformationRecord {
                id: tr.id,
                name: tr.name,
                description: tr.description,
                kind: tr.kind,
                script: tr.script,
                status: tr.status,
                created_at: tr.created_at,
                source,
                target,
            }
        })
        .collect()
}
