use anyhow::{bail, Context, Result};
use std::{
    fs::{self, File},
    hash::Hasher,
    io::{BufRead, BufReader, BufWriter, ErrorKind, Write},
    path::{Path, PathBuf},
};

use crate::apps::{KeyValue, MapFn, ReduceFn};
use crate::job::{Task, TaskId};

/* =========================
   Particiones y nombres de archivo
   ========================= */

/// Hash de una clave intermedia: FNV-1a de 64 bits enmascarado a 31 bits.
///
/// No es el FNV-1a de 32 bits, así que las particiones no coinciden con las
/// de otras implementaciones que usen esa variante.
///
/// Todos los workers tienen que coincidir en esta función: de ella depende
/// que cada clave termine en un único reduce.
pub fn ihash(key: &str) -> u32 {
    let mut h = fnv::FnvHasher::default();
    h.write(key.as_bytes());
    (h.finish() & 0x7fff_ffff) as u32
}

/// Partición de reduce para una clave: `ihash(key) % n_reduce`.
pub fn partition_for(key: &str, n_reduce: usize) -> usize {
    ihash(key) as usize % n_reduce.max(1)
}

/// `mr-<map_id>-<particion>`
pub fn intermediate_name(map_id: TaskId, partition: usize) -> String {
    format!("mr-{}-{}", map_id, partition)
}

/// `mr-out-<particion>`
pub fn output_name(partition: usize) -> String {
    format!("mr-out-{}", partition)
}

/// Descompone un identificador intermedio `mr-<map_id>-<particion>` (se
/// mira sólo el nombre de archivo, no el directorio).
pub fn parse_intermediate(file: &str) -> Option<(TaskId, usize)> {
    let name = Path::new(file).file_name()?.to_str()?;
    let mut parts = name.split('-');
    if parts.next() != Some("mr") {
        return None;
    }
    let map_id: TaskId = parts.next()?.parse().ok()?;
    let partition = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((map_id, partition))
}

/// Partición embebida en un identificador intermedio.
pub fn partition_of(file: &str) -> Option<usize> {
    parse_intermediate(file).map(|(_, p)| p)
}

/* =========================
   Registros intermedios (JSON lines)
   ========================= */

/// Escribe los pares como JSON lines; cada línea es un registro autocontenido.
pub fn write_partition(path: &Path, records: &[KeyValue]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("no se pudo crear {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for kv in records {
        serde_json::to_writer(&mut writer, kv)?;
        writer.write_all(b"\n")?;
    }

    writer.flush()?;
    Ok(())
}

/// Lee un archivo intermedio completo.
pub fn read_partition(path: &Path) -> Result<Vec<KeyValue>> {
    let file = File::open(path)
        .with_context(|| format!("no se pudo abrir {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut out = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let kv: KeyValue = serde_json::from_str(&line)
            .with_context(|| format!("registro inválido en {}", path.display()))?;
        out.push(kv);
    }

    Ok(out)
}

/* =========================
   Ejecución de un map
   ========================= */

/// Ejecuta un map completo:
/// 1. lee cada split y le aplica `map_fn`
/// 2. reparte los pares en un buffer por partición
/// 3. escribe `mr-<id>-<p>` en `work_dir` para cada partición
///
/// Devuelve los nombres de los archivos producidos, en orden de partición.
/// Se escribe un archivo por partición aunque quede vacío, para que la
/// barrera de cada partición pueda completarse.
pub fn execute_map(task: &Task, map_fn: MapFn, work_dir: &Path) -> Result<Vec<String>> {
    let n_reduce = task.n_reduce.max(1);
    let mut buckets: Vec<Vec<KeyValue>> = vec![Vec::new(); n_reduce];

    for input in &task.inputs {
        // bytes crudos: un split que no es UTF-8 se procesa igual
        let bytes = fs::read(input)
            .with_context(|| format!("no se pudo leer el split {}", input))?;
        let contents = String::from_utf8_lossy(&bytes);

        for kv in map_fn(input, &contents) {
            let p = partition_for(&kv.key, n_reduce);
            buckets[p].push(kv);
        }
    }

    let mut files = Vec::with_capacity(n_reduce);
    for (p, records) in buckets.iter().enumerate() {
        let name = intermediate_name(task.id, p);
        write_partition(&work_dir.join(&name), records)?;
        files.push(name);
    }

    Ok(files)
}

/* =========================
   Ejecución de un reduce
   ========================= */

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReduceOutcome {
    /// El job no traía archivos: no se hizo nada
    NoInputs,
    /// Se escribió la salida definitiva
    Committed(PathBuf),
    /// Otro worker ya había confirmado esta partición; se descartó lo nuestro
    AlreadyCommitted(PathBuf),
}

/// Ejecuta un reduce y confirma su salida de forma idempotente.
///
/// La salida se escribe primero en un temporal dentro de `work_dir`; sólo
/// se renombra a `mr-out-<p>` si ese archivo todavía no existe. El temporal
/// se borra siempre al salir, se haya renombrado o no.
pub fn execute_reduce(task: &Task, reduce_fn: ReduceFn, work_dir: &Path) -> Result<ReduceOutcome> {
    let Some(first) = task.inputs.first() else {
        return Ok(ReduceOutcome::NoInputs);
    };

    let partition = match partition_of(first) {
        Some(p) => p,
        None => bail!("identificador intermedio sin partición: {}", first),
    };

    let mut kvs: Vec<KeyValue> = Vec::new();
    for name in &task.inputs {
        kvs.extend(read_partition(&work_dir.join(name))?);
    }
    kvs.sort_by(|a, b| a.key.cmp(&b.key));

    let final_name = output_name(partition);
    let final_path = work_dir.join(&final_name);

    // NamedTempFile se borra en drop salvo que se persista
    let mut tmp = tempfile::Builder::new()
        .prefix(&format!("{}-", final_name))
        .tempfile_in(work_dir)
        .with_context(|| format!("no se pudo crear temporal en {}", work_dir.display()))?;

    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        let mut i = 0;
        while i < kvs.len() {
            let mut j = i + 1;
            while j < kvs.len() && kvs[j].key == kvs[i].key {
                j += 1;
            }
            let values: Vec<String> = kvs[i..j].iter().map(|kv| kv.value.clone()).collect();
            let output = reduce_fn(&kvs[i].key, &values);
            writeln!(writer, "{} {}", kvs[i].key, output)?;
            i = j;
        }
        writer.flush()?;
    }

    if final_path.exists() {
        return Ok(ReduceOutcome::AlreadyCommitted(final_path));
    }

    match tmp.persist_noclobber(&final_path) {
        Ok(_) => Ok(ReduceOutcome::Committed(final_path)),
        // otro worker ganó la carrera entre el exists() y el rename
        Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
            Ok(ReduceOutcome::AlreadyCommitted(final_path))
        }
        Err(e) => Err(anyhow::Error::new(e.error)
            .context(format!("no se pudo confirmar {}", final_path.display()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::wc;
    use tempfile::TempDir;

    fn write_split(dir: &Path, name: &str, contents: &str) -> String {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path.to_string_lossy().to_string()
    }

    fn map_task(id: TaskId, inputs: Vec<String>, n_reduce: usize) -> Task {
        Task {
            id,
            inputs,
            n_reduce,
        }
    }

    /* ============
       PARTICIONES
       ============ */

    #[test]
    fn ihash_es_determinista_y_de_31_bits() {
        assert_eq!(ihash("hola"), ihash("hola"));
        assert_ne!(ihash("hola"), ihash("mundo"));
        for k in ["", "a", "zzzzzzzzzzzz", "ñandú"] {
            assert!(ihash(k) <= 0x7fff_ffff);
        }
    }

    #[test]
    fn ihash_es_fnv1a_de_64_bits_enmascarado() {
        // offset basis de 64 bits & 0x7fffffff
        assert_eq!(ihash(""), 69_346_085);
        assert_eq!(ihash("a"), 100_789_388);
        assert_eq!(ihash("hola"), 2_121_085_239);
        // la variante de 32 bits daría otro valor
        assert_ne!(ihash("a"), 1_678_518_572);
    }

    #[test]
    fn partition_for_retorna_id_en_rango() {
        for k in ["a", "b", "c", "hola", "mundo", "x_y_z"] {
            assert!(partition_for(k, 4) < 4);
        }
        assert_eq!(partition_for("lo-que-sea", 1), 0);
    }

    #[test]
    fn partition_of_lee_el_ultimo_segmento() {
        assert_eq!(partition_of("mr-0-1"), Some(1));
        assert_eq!(partition_of("mr-12-7"), Some(7));
        assert_eq!(partition_of("/tmp/mis-datos/mr-3-2"), Some(2));
        assert_eq!(partition_of(&intermediate_name(42, 9)), Some(9));
    }

    #[test]
    fn parse_intermediate_devuelve_map_y_particion() {
        assert_eq!(parse_intermediate("mr-12-7"), Some((12, 7)));
        assert_eq!(parse_intermediate("/tmp/mr-3-2"), Some((3, 2)));
        assert_eq!(parse_intermediate("mr-x-2"), None);
    }

    #[test]
    fn partition_of_rechaza_nombres_ajenos() {
        assert_eq!(partition_of("mr-out-1"), None);
        assert_eq!(partition_of("pg-1.txt"), None);
        assert_eq!(partition_of("mr-1"), None);
        assert_eq!(partition_of("mr-1-2-3"), None);
    }

    #[test]
    fn read_partition_preserva_espacios_y_saltos_de_linea() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mr-0-0");
        let records = vec![
            KeyValue::new("con espacio", "valor\ncon salto"),
            KeyValue::new("", "\"comillas\""),
        ];

        write_partition(&path, &records).unwrap();

        assert_eq!(read_partition(&path).unwrap(), records);
    }

    /* ============
       MAP
       ============ */

    #[test]
    fn execute_map_escribe_un_archivo_por_particion() {
        let tmp = TempDir::new().unwrap();
        let split = write_split(tmp.path(), "a.txt", "uno dos tres uno");

        let files = execute_map(&map_task(7, vec![split], 3), wc::map, tmp.path()).unwrap();

        assert_eq!(files, vec!["mr-7-0", "mr-7-1", "mr-7-2"]);

        let mut all = Vec::new();
        for (p, name) in files.iter().enumerate() {
            let kvs = read_partition(&tmp.path().join(name)).unwrap();
            for kv in &kvs {
                assert_eq!(partition_for(&kv.key, 3), p);
            }
            all.extend(kvs);
        }
        all.sort();
        let keys: Vec<&str> = all.iter().map(|kv| kv.key.as_str()).collect();
        assert_eq!(keys, vec!["dos", "tres", "uno", "uno"]);
    }

    #[test]
    fn execute_map_acepta_splits_que_no_son_utf8() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("latin1.txt");
        fs::write(&path, b"caf\xe9 ni\xf1o hola").unwrap();

        let files = execute_map(
            &map_task(3, vec![path.to_string_lossy().to_string()], 1),
            wc::map,
            tmp.path(),
        )
        .unwrap();

        let kvs = read_partition(&tmp.path().join(&files[0])).unwrap();
        let keys: Vec<&str> = kvs.iter().map(|kv| kv.key.as_str()).collect();
        assert!(keys.contains(&"hola"));
        assert!(keys.contains(&"caf"));
    }

    #[test]
    fn execute_map_falla_si_falta_el_split() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("no_existe.txt");

        let res = execute_map(
            &map_task(0, vec![missing.to_string_lossy().to_string()], 2),
            wc::map,
            tmp.path(),
        );

        assert!(res.is_err());
        assert!(!tmp.path().join("mr-0-0").exists());
    }

    /* ============
       REDUCE
       ============ */

    fn map_then_reduce_task(tmp: &Path, partition: usize) -> Task {
        let a = write_split(tmp, "a.txt", "b a c a");
        let b = write_split(tmp, "b.txt", "a c c d");
        let mut inputs = Vec::new();
        for (id, split) in [a, b].into_iter().enumerate() {
            let files = execute_map(&map_task(id as TaskId, vec![split], 1), wc::map, tmp).unwrap();
            inputs.push(files[partition].clone());
        }
        map_task(100, inputs, 1)
    }

    #[test]
    fn execute_reduce_agrupa_y_ordena_por_clave() {
        let tmp = TempDir::new().unwrap();
        let task = map_then_reduce_task(tmp.path(), 0);

        let outcome = execute_reduce(&task, wc::reduce, tmp.path()).unwrap();

        let out_path = tmp.path().join("mr-out-0");
        assert_eq!(outcome, ReduceOutcome::Committed(out_path.clone()));
        let content = fs::read_to_string(&out_path).unwrap();
        assert_eq!(content, "a 3\nb 1\nc 3\nd 1\n");
    }

    #[test]
    fn execute_reduce_dos_veces_no_altera_la_salida() {
        let tmp = TempDir::new().unwrap();
        let task = map_then_reduce_task(tmp.path(), 0);

        execute_reduce(&task, wc::reduce, tmp.path()).unwrap();
        let first = fs::read(tmp.path().join("mr-out-0")).unwrap();

        let again = execute_reduce(&task, wc::reduce, tmp.path()).unwrap();
        let second = fs::read(tmp.path().join("mr-out-0")).unwrap();

        assert_eq!(again, ReduceOutcome::AlreadyCommitted(tmp.path().join("mr-out-0")));
        assert_eq!(first, second);
    }

    #[test]
    fn execute_reduce_no_deja_temporales() {
        let tmp = TempDir::new().unwrap();
        let task = map_then_reduce_task(tmp.path(), 0);

        execute_reduce(&task, wc::reduce, tmp.path()).unwrap();
        execute_reduce(&task, wc::reduce, tmp.path()).unwrap();

        let leftovers: Vec<String> = fs::read_dir(tmp.path())
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|n| n.starts_with("mr-out-0-"))
            .collect();
        assert!(leftovers.is_empty(), "temporales sin borrar: {:?}", leftovers);
    }

    #[test]
    fn execute_reduce_sin_entradas_no_hace_nada() {
        let tmp = TempDir::new().unwrap();

        let outcome = execute_reduce(&map_task(5, vec![], 2), wc::reduce, tmp.path()).unwrap();

        assert_eq!(outcome, ReduceOutcome::NoInputs);
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn execute_reduce_falla_si_falta_un_intermedio() {
        let tmp = TempDir::new().unwrap();

        let res = execute_reduce(
            &map_task(5, vec!["mr-0-1".into(), "mr-1-1".into()], 2),
            wc::reduce,
            tmp.path(),
        );

        assert!(res.is_err());
        assert!(!tmp.path().join("mr-out-1").exists());
    }
}
